use std::fmt;

use serde::{Deserialize, Serialize};

/// Directory role, stored as the `user_role` Postgres enum.
///
/// Every externally supplied role string must pass through [`Role::normalize`],
/// so a persisted role is always exactly one of the two enumerated values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Case-insensitive parse. Anything that is not `ADMIN` coerces to `USER`.
    pub fn normalize(input: &str) -> Role {
        match input.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Role::Admin,
            _ => Role::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_case_insensitive() {
        assert_eq!(Role::normalize("admin"), Role::Admin);
        assert_eq!(Role::normalize("Admin"), Role::Admin);
        assert_eq!(Role::normalize("ADMIN"), Role::Admin);
        assert_eq!(Role::normalize("user"), Role::User);
        assert_eq!(Role::normalize("  USER  "), Role::User);
    }

    #[test]
    fn normalize_coerces_unknown_values_to_user() {
        assert_eq!(Role::normalize("moderator"), Role::User);
        assert_eq!(Role::normalize(""), Role::User);
        assert_eq!(Role::normalize("ADMIN "), Role::Admin);
        assert_eq!(Role::normalize("super-admin"), Role::User);
    }

    #[test]
    fn display_matches_wire_values() {
        assert_eq!(Role::User.to_string(), "USER");
        assert_eq!(Role::Admin.to_string(), "ADMIN");
    }
}
