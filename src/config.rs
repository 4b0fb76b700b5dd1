use std::net::IpAddr;

use crate::models::Role;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub log_level: String,
    pub site: SiteConfig,
    pub auth: AuthPolicy,
    pub smtp: Option<SmtpConfig>,
}

/// Site identity used in page chrome and email footers.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub name: String,
    pub contact_address: String,
}

/// Declarative knobs for the identity flows.
#[derive(Debug, Clone)]
pub struct AuthPolicy {
    /// Sign-in fails with `UNVERIFIED` until the verification token is consumed.
    pub require_email_verification: bool,
    /// Issue a verification token/email immediately after sign-up.
    pub send_on_sign_up: bool,
    /// Consuming a verification token also establishes a session.
    pub auto_sign_in_after_verification: bool,
    /// Role assigned to newly created accounts.
    pub default_role: Role,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("DOORMAN_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid DOORMAN_HOST: {e}"))?;

        let port: u16 = env_or("DOORMAN_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid DOORMAN_PORT: {e}"))?;

        let base_url = env_or("DOORMAN_BASE_URL", &format!("http://{host}:{port}"));

        let log_level = env_or("DOORMAN_LOG_LEVEL", "info");

        let site = SiteConfig {
            name: env_or("DOORMAN_SITE_NAME", "Acme Inc"),
            contact_address: env_or(
                "DOORMAN_CONTACT_ADDRESS",
                "123 Main St, San Francisco, CA 94105",
            ),
        };

        let auth = AuthPolicy {
            require_email_verification: env_bool("DOORMAN_REQUIRE_EMAIL_VERIFICATION", true)?,
            send_on_sign_up: env_bool("DOORMAN_SEND_ON_SIGN_UP", true)?,
            auto_sign_in_after_verification: env_bool(
                "DOORMAN_AUTO_SIGN_IN_AFTER_VERIFICATION",
                true,
            )?,
            default_role: Role::normalize(&env_or("DOORMAN_DEFAULT_ROLE", "USER")),
        };

        let smtp = match (
            std::env::var("DOORMAN_SMTP_HOST").ok(),
            std::env::var("DOORMAN_SMTP_PORT").ok(),
            std::env::var("DOORMAN_SMTP_USER").ok(),
            std::env::var("DOORMAN_SMTP_PASS").ok(),
            std::env::var("DOORMAN_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid DOORMAN_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            base_url,
            log_level,
            site,
            auth,
            smtp,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_bool(key: &str, default: bool) -> Result<bool, String> {
    match std::env::var(key) {
        Ok(value) => match value.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(format!("Invalid {key}: expected boolean, got '{other}'")),
        },
        Err(_) => Ok(default),
    }
}
