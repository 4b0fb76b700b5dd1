pub mod admin;
pub mod auth;
pub mod home;

use axum::routing::get;
use axum::Router;

use crate::state::SharedState;

pub fn view_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(home::index))
        // Auth views
        .route("/auth/login", get(auth::login_page))
        .route("/auth/register", get(auth::register_page))
        .route("/auth/forgot-password", get(auth::forgot_password_page))
        .route("/auth/reset-password", get(auth::reset_password_page))
        .route("/auth/verify-email", get(auth::verify_email_page))
        // Admin
        .route("/admin/users", get(admin::users_page))
}
