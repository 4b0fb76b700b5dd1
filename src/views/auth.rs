use askama::Template;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::auth::jwt;
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginTemplate {
    site_name: String,
}

#[derive(Template)]
#[template(path = "auth/register.html")]
struct RegisterTemplate {
    site_name: String,
}

#[derive(Template)]
#[template(path = "auth/forgot_password.html")]
struct ForgotPasswordTemplate {
    site_name: String,
}

#[derive(Template)]
#[template(path = "auth/reset_password.html")]
struct ResetPasswordTemplate {
    site_name: String,
    token: Option<String>,
}

#[derive(Template)]
#[template(path = "auth/verify_email.html")]
struct VerifyEmailTemplate {
    site_name: String,
    token: Option<String>,
}

#[derive(Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

pub async fn login_page(State(state): State<SharedState>, jar: CookieJar) -> Response {
    // Already logged in: straight to the landing page
    if let Some(cookie) = jar.get("access_token") {
        if jwt::decode_token(cookie.value(), &state.config.jwt_secret).is_ok() {
            return Redirect::to("/").into_response();
        }
    }

    let template = LoginTemplate {
        site_name: state.config.site.name.clone(),
    };
    Html(template.render().unwrap_or_default()).into_response()
}

pub async fn register_page(State(state): State<SharedState>) -> impl IntoResponse {
    let template = RegisterTemplate {
        site_name: state.config.site.name.clone(),
    };
    Html(template.render().unwrap_or_default())
}

pub async fn forgot_password_page(State(state): State<SharedState>) -> impl IntoResponse {
    let template = ForgotPasswordTemplate {
        site_name: state.config.site.name.clone(),
    };
    Html(template.render().unwrap_or_default())
}

/// The reset link lands here with a `token` query parameter. When the
/// parameter is absent the page is a dead end and the form never renders.
pub async fn reset_password_page(
    State(state): State<SharedState>,
    Query(q): Query<TokenQuery>,
) -> impl IntoResponse {
    let template = ResetPasswordTemplate {
        site_name: state.config.site.name.clone(),
        token: q.token.filter(|t| !t.trim().is_empty()),
    };
    Html(template.render().unwrap_or_default())
}

pub async fn verify_email_page(
    State(state): State<SharedState>,
    Query(q): Query<TokenQuery>,
) -> impl IntoResponse {
    let template = VerifyEmailTemplate {
        site_name: state.config.site.name.clone(),
        token: q.token.filter(|t| !t.trim().is_empty()),
    };
    Html(template.render().unwrap_or_default())
}
