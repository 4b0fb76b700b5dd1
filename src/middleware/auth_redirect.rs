use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

/// Browser-facing routes bounce unauthenticated visitors to the login page
/// instead of surfacing a bare 401.
pub async fn redirect_unauthorized(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    if response.status() == StatusCode::UNAUTHORIZED {
        return Redirect::to("/auth/login").into_response();
    }
    response
}
