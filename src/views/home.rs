use askama::Template;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum_extra::extract::CookieJar;

use crate::auth::jwt;
use crate::models::Role;
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    site_name: String,
    logged_in: bool,
    is_admin: bool,
}

pub async fn index(State(state): State<SharedState>, jar: CookieJar) -> impl IntoResponse {
    let claims = jar
        .get("access_token")
        .and_then(|c| jwt::decode_token(c.value(), &state.config.jwt_secret).ok());

    let template = IndexTemplate {
        site_name: state.config.site.name.clone(),
        logged_in: claims.is_some(),
        is_admin: claims.map(|c| c.role == Role::Admin).unwrap_or(false),
    };
    Html(template.render().unwrap_or_default())
}
