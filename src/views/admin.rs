use askama::Template;
use axum::extract::State;
use axum::response::{Html, IntoResponse};

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::User;
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "admin/users.html")]
struct UsersTemplate {
    site_name: String,
    users: Vec<User>,
    total: usize,
    verified: usize,
    admins: usize,
}

pub async fn users_page(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    auth.require_admin()?;

    let users = db::users::list(&state.pool, 100).await?;
    let total = users.len();
    let verified = users.iter().filter(|u| u.email_verified).count();
    let admins = users.iter().filter(|u| u.role.is_admin()).count();

    let template = UsersTemplate {
        site_name: state.config.site.name.clone(),
        users,
        total,
        verified,
        admins,
    };
    Ok(Html(template.render().unwrap_or_default()))
}
