use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AuthUser;
use crate::auth::jwt::{encode_token, Claims};
use crate::auth::{password, tokens, validate};
use crate::db;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::{Role, User};
use crate::state::SharedState;

const REFRESH_TTL_DAYS: i64 = 7;
const VERIFICATION_TTL_HOURS: i64 = 24;
const RESET_TTL_HOURS: i64 = 1;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SendVerificationRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    pub token: Option<String>,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

fn auth_cookies(access_token: &str, refresh_token: &str) -> CookieJar {
    let access = Cookie::build(("access_token", access_token.to_string()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(15))
        .build();

    let refresh = Cookie::build(("refresh_token", refresh_token.to_string()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(REFRESH_TTL_DAYS))
        .build();

    CookieJar::new().add(access).add(refresh)
}

fn clear_auth_cookies() -> CookieJar {
    let access = Cookie::build(("access_token", ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    let refresh = Cookie::build(("refresh_token", ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    CookieJar::new().add(access).add(refresh)
}

/// Issue an access token plus a rotating refresh token for the user.
async fn issue_session(
    state: &SharedState,
    user: &User,
) -> Result<(CookieJar, AuthResponse), AppError> {
    let claims = Claims::new(user.id, user.role);
    let access_token =
        encode_token(&claims, &state.config.jwt_secret).map_err(AppError::Internal)?;

    let refresh = tokens::generate();
    let refresh_hash = tokens::sha256_hex(&refresh);
    db::refresh_tokens::create(
        &state.pool,
        user.id,
        &refresh_hash,
        Utc::now() + Duration::days(REFRESH_TTL_DAYS),
    )
    .await?;

    let jar = auth_cookies(&access_token, &refresh);
    Ok((
        jar,
        AuthResponse {
            access_token,
            refresh_token: refresh,
        },
    ))
}

/// Issue a fresh verification token and dispatch the verification email.
///
/// Prior unexpired tokens are invalidated first. Email dispatch is
/// best-effort: the token stays valid even when the send fails, and the
/// hook completes before the caller's response goes out.
async fn issue_verification(state: &SharedState, user: &User) -> Result<(), AppError> {
    db::verification_tokens::delete_all_for_user(&state.pool, user.id).await?;

    let token = tokens::generate();
    let token_hash = tokens::sha256_hex(&token);
    db::verification_tokens::create(
        &state.pool,
        user.id,
        &token_hash,
        Utc::now() + Duration::hours(VERIFICATION_TTL_HOURS),
    )
    .await?;

    let url = format!(
        "{}/auth/verify-email?token={token}",
        state.config.base_url
    );

    match &state.mailer {
        Some(mailer) => {
            if let Err(e) = mailer
                .send_verification(&user.email, &user.first_name, &url)
                .await
            {
                tracing::error!("Failed to send verification email: {e}");
            }
        }
        None => {
            tracing::warn!(
                "SMTP not configured. Verification token for {}: {token}",
                user.email
            );
        }
    }

    Ok(())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    // Shape checks come first; nothing below runs on bad input.
    validate::name("First name", &req.first_name)?;
    validate::name("Last name", &req.last_name)?;
    validate::email(&req.email)?;
    validate::password(&req.password)?;

    let email = normalize_email(&req.email);
    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;

    // Advisory lock so concurrent first registrations cannot both bootstrap
    let mut tx = state.pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock(1)")
        .execute(&mut *tx)
        .await?;

    let count = db::users::count_all(&mut *tx).await?;
    let role = if count == 0 {
        Role::Admin
    } else {
        state.config.auth.default_role
    };

    let user = db::users::create(
        &mut *tx,
        &email,
        &pw_hash,
        req.first_name.trim(),
        req.last_name.trim(),
        role,
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("An account with this email already exists".to_string())
        }
        _ => AppError::Database(e),
    })?;

    tx.commit().await?;

    audit::log_event(
        &state.pool,
        Some(user.id),
        "user.registered",
        "user",
        Some(user.id),
        None,
    )
    .await;

    let message = if state.config.auth.send_on_sign_up {
        issue_verification(&state, &user).await?;
        "Account created. Check your email to verify your address.".to_string()
    } else {
        "Account created.".to_string()
    };

    Ok(Json(MessageResponse { message }))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    validate::email(&req.email)?;
    if req.password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }

    if state.login_limiter.check(&req.email).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let user = db::users::find_by_email(&state.pool, &normalize_email(&req.email))
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let valid = password::verify(&req.password, &user.password_hash).map_err(AppError::Internal)?;

    if !valid {
        state.login_limiter.record_failure(&req.email);
        return Err(AppError::InvalidCredentials);
    }

    // Correct credentials, unverified address: distinct error kind so the
    // client can offer a resend action.
    if state.config.auth.require_email_verification && !user.email_verified {
        return Err(AppError::Unverified);
    }

    let (jar, auth) = issue_session(&state, &user).await?;

    audit::log_event(
        &state.pool,
        Some(user.id),
        "user.login",
        "user",
        Some(user.id),
        None,
    )
    .await;

    Ok((jar, Json(auth)))
}

/// Idempotent resend of the verification email. Answers the same way for
/// every input so the endpoint cannot be used to probe for accounts.
pub async fn send_verification(
    State(state): State<SharedState>,
    Json(req): Json<SendVerificationRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    validate::email(&req.email)?;

    if let Some(user) = db::users::find_by_email(&state.pool, &normalize_email(&req.email)).await? {
        if !user.email_verified {
            issue_verification(&state, &user).await?;
        }
    }

    Ok(Json(MessageResponse {
        message: "If that address has an unverified account, a new verification email is on its way."
            .to_string(),
    }))
}

pub async fn verify_email(
    State(state): State<SharedState>,
    Json(req): Json<VerifyEmailRequest>,
) -> Result<(CookieJar, Json<VerifyResponse>), AppError> {
    // A link without a token is a dead end; don't touch the store for it.
    let token = match req.token.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => {
            return Err(AppError::InvalidToken(
                "Verification token is missing".to_string(),
            ))
        }
    };

    let token_hash = tokens::sha256_hex(&token);
    let stored = db::verification_tokens::find_valid_by_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::InvalidToken("Invalid or expired verification token".to_string())
        })?;

    db::verification_tokens::mark_used(&state.pool, stored.id).await?;
    db::users::mark_email_verified(&state.pool, stored.user_id).await?;

    let user = db::users::find_by_id(&state.pool, stored.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    audit::log_event(
        &state.pool,
        Some(user.id),
        "user.verified",
        "user",
        Some(user.id),
        None,
    )
    .await;

    if state.config.auth.auto_sign_in_after_verification {
        let (jar, auth) = issue_session(&state, &user).await?;
        Ok((
            jar,
            Json(VerifyResponse {
                message: "Email verified. You are now logged in.".to_string(),
                access_token: Some(auth.access_token),
                refresh_token: Some(auth.refresh_token),
            }),
        ))
    } else {
        Ok((
            CookieJar::new(),
            Json(VerifyResponse {
                message: "Email verified. You can now log in.".to_string(),
                access_token: None,
                refresh_token: None,
            }),
        ))
    }
}

/// Always answers success so the endpoint reveals nothing about which
/// emails have accounts. The reset email, when one is owed, is dispatched
/// before the response goes out.
pub async fn forgot_password(
    State(state): State<SharedState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    validate::email(&req.email)?;

    if let Some(user) = db::users::find_by_email(&state.pool, &normalize_email(&req.email)).await? {
        let token = tokens::generate();
        let token_hash = tokens::sha256_hex(&token);
        db::password_reset_tokens::create(
            &state.pool,
            user.id,
            &token_hash,
            Utc::now() + Duration::hours(RESET_TTL_HOURS),
        )
        .await?;

        let url = format!(
            "{}/auth/reset-password?token={token}",
            state.config.base_url
        );

        match &state.mailer {
            Some(mailer) => {
                if let Err(e) = mailer.send_password_reset(&user.email, &url).await {
                    tracing::error!("Failed to send password reset email: {e}");
                }
            }
            None => {
                tracing::warn!(
                    "SMTP not configured. Password reset token for {}: {token}",
                    user.email
                );
            }
        }
    }

    Ok(Json(MessageResponse {
        message: "If that email is registered, a reset link has been sent.".to_string(),
    }))
}

pub async fn reset_password(
    State(state): State<SharedState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    validate::password(&req.password)?;
    validate::passwords_match(&req.password, &req.confirm_password)?;

    // A callback URL without the token parameter never reaches the store.
    let token = match req.token.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => return Err(AppError::InvalidToken("Reset token is missing".to_string())),
    };

    let token_hash = tokens::sha256_hex(&token);
    let reset_token = db::password_reset_tokens::find_valid_by_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| AppError::InvalidToken("Invalid or expired reset token".to_string()))?;

    db::password_reset_tokens::mark_used(&state.pool, reset_token.id).await?;

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;
    db::users::update_password(&state.pool, reset_token.user_id, &pw_hash).await?;

    // Every open session dies with the old credential
    db::refresh_tokens::delete_all_for_user(&state.pool, reset_token.user_id).await?;

    audit::log_event(
        &state.pool,
        Some(reset_token.user_id),
        "user.password_reset",
        "user",
        Some(reset_token.user_id),
        None,
    )
    .await;

    Ok(Json(MessageResponse {
        message: "Password reset successfully. You can now log in.".to_string(),
    }))
}

pub async fn refresh(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let refresh_value = jar
        .get("refresh_token")
        .map(|c| c.value().to_string())
        .ok_or_else(|| AppError::Unauthorized("Missing refresh token".to_string()))?;

    let token_hash = tokens::sha256_hex(&refresh_value);

    let stored = db::refresh_tokens::find_by_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    if stored.used {
        tracing::warn!(
            "Refresh token reuse detected for user {}. Revoking all sessions.",
            stored.user_id
        );
        db::refresh_tokens::delete_all_for_user(&state.pool, stored.user_id).await?;
        return Err(AppError::Unauthorized(
            "Refresh token reuse detected. All sessions revoked.".to_string(),
        ));
    }

    if stored.expires_at < Utc::now() {
        return Err(AppError::Unauthorized("Refresh token expired".to_string()));
    }

    db::refresh_tokens::mark_used(&state.pool, stored.id).await?;

    let user = db::users::find_by_id(&state.pool, stored.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    let (new_jar, auth) = issue_session(&state, &user).await?;
    Ok((new_jar, Json(auth)))
}

pub async fn logout(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    if let Some(cookie) = jar.get("refresh_token") {
        let token_hash = tokens::sha256_hex(cookie.value());
        db::refresh_tokens::delete_by_hash(&state.pool, &token_hash).await?;
    }

    Ok((
        clear_auth_cookies(),
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    ))
}

pub async fn change_password(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    validate::password(&req.new_password)?;

    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    let valid =
        password::verify(&req.current_password, &user.password_hash).map_err(AppError::Internal)?;

    if !valid {
        return Err(AppError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let pw_hash = password::hash(&req.new_password).map_err(AppError::Internal)?;
    db::users::update_password(&state.pool, user.id, &pw_hash).await?;

    // Revoke existing sessions, then issue fresh tokens for this one
    db::refresh_tokens::delete_all_for_user(&state.pool, user.id).await?;

    let (jar, auth_resp) = issue_session(&state, &user).await?;

    audit::log_event(
        &state.pool,
        Some(user.id),
        "user.password_changed",
        "user",
        Some(user.id),
        None,
    )
    .await;

    Ok((jar, Json(auth_resp)))
}
