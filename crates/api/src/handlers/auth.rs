//! Handlers for the `/auth` resource (register, login, refresh, logout, me).

use axum::extract::State;
use axum::http::header::{SET_COOKIE, USER_AGENT};
use axum::http::{HeaderMap, HeaderName};
use axum::Json;
use chrono::Utc;
use panotour_core::error::CoreError;
use panotour_core::types::DbId;
use panotour_db::models::session::CreateSession;
use panotour_db::models::user::{CreateUser, User, UserResponse};
use panotour_db::repositories::{SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::cookie::{clear_refresh_cookie, read_refresh_token, refresh_cookie};
use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::middleware::auth::AuthUser;
use crate::response::{Envelope, NoData, UserPayload};
use crate::state::AppState;

/// A `Set-Cookie` header ready to prepend to a response.
type SetCookie = [(HeaderName, String); 1];

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 50, message = "Username must be 1-50 characters"))]
    pub username: String,
    #[validate(email(message = "Email is not valid"))]
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login payload: the user's public fields plus the access token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[serde(flatten)]
    pub user: UserResponse,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenPayload {
    pub access_token: String,
}

/// Identity decoded from the caller's access token.
#[derive(Debug, Serialize)]
pub struct IdentityPayload {
    pub id: DbId,
    pub admin: bool,
    pub iat: i64,
    pub exp: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/register
///
/// Create a non-admin account. The response never includes the password hash.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RegisterRequest>,
) -> AppResult<Json<Envelope<UserPayload>>> {
    let input = RegisterRequest {
        username: input.username.trim().to_string(),
        email: input.email.trim().to_lowercase(),
        ..input
    };
    input.validate().map_err(CoreError::from)?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username,
            email: input.email,
            password_hash,
            is_admin: false,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok(Json(Envelope::ok(
        "User registered successfully",
        UserPayload {
            user: UserResponse::from(&user),
        },
    )))
}

/// POST /api/auth/login
///
/// Authenticate with email + password. Returns the user and an access token;
/// the refresh token is set as an HttpOnly cookie. A failed login sets no
/// cookie.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(input): ApiJson<LoginRequest>,
) -> AppResult<(SetCookie, Json<Envelope<LoginPayload>>)> {
    let user = UserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", input.email.trim())))?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Login rejected: incorrect password");
        return Err(AppError::unauthorized("Incorrect password"));
    }

    let access_token = access_token_for(&state, &user)?;
    let (refresh_plaintext, session) = new_session(&state, user.id, &headers);
    SessionRepo::create(&state.pool, &session).await?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok((
        set_refresh_cookie(&state, &refresh_plaintext),
        Json(Envelope::ok(
            "Logged in successfully",
            LoginPayload {
                user: UserResponse::from(&user),
                access_token,
            },
        )),
    ))
}

/// POST /api/auth/refresh
///
/// Exchange the `refreshToken` cookie for a new access token and a rotated
/// refresh cookie. Each refresh token is accepted exactly once.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<(SetCookie, Json<Envelope<AccessTokenPayload>>)> {
    let presented = read_refresh_token(&headers)
        .ok_or_else(|| AppError::unauthorized("You're not authenticated"))?;

    let session = SessionRepo::find_active_by_hash(&state.pool, &hash_refresh_token(&presented))
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;

    let access_token = access_token_for(&state, &user)?;
    let (refresh_plaintext, replacement) = new_session(&state, user.id, &headers);

    // A concurrent refresh with the same token may have won the race.
    SessionRepo::rotate(&state.pool, session.id, &replacement)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

    tracing::debug!(user_id = user.id, "Refresh token rotated");

    Ok((
        set_refresh_cookie(&state, &refresh_plaintext),
        Json(Envelope::ok(
            "Token refreshed",
            AccessTokenPayload { access_token },
        )),
    ))
}

/// POST /api/auth/logout
///
/// Revoke the session behind the presented refresh cookie and clear it.
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
    headers: HeaderMap,
) -> AppResult<(SetCookie, Json<Envelope<NoData>>)> {
    if let Some(token) = read_refresh_token(&headers) {
        let revoked = SessionRepo::revoke_by_hash(&state.pool, &hash_refresh_token(&token)).await?;
        tracing::info!(user_id = auth_user.user_id, revoked, "User logged out");
    }

    let cleared = clear_refresh_cookie(state.config.cookie_secure);
    Ok((
        [(SET_COOKIE, cleared.to_string())],
        Json(Envelope::message("Logged out!")),
    ))
}

/// GET /api/auth/me
///
/// Return the identity carried by the caller's access token.
pub async fn me(auth_user: AuthUser) -> Json<Envelope<IdentityPayload>> {
    Json(Envelope::ok(
        "Authenticated",
        IdentityPayload {
            id: auth_user.user_id,
            admin: auth_user.is_admin,
            iat: auth_user.issued_at,
            exp: auth_user.expires_at,
        },
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn access_token_for(state: &AppState, user: &User) -> AppResult<String> {
    generate_access_token(user.id, user.is_admin, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))
}

/// Mint a refresh token and the session row that will hold its hash.
fn new_session(state: &AppState, user_id: DbId, headers: &HeaderMap) -> (String, CreateSession) {
    let (plaintext, hash) = generate_refresh_token();
    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    let session = CreateSession {
        user_id,
        refresh_token_hash: hash,
        expires_at,
        user_agent: header_str(headers, USER_AGENT.as_str()),
        ip_address: header_str(headers, "x-forwarded-for")
            .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_string())),
    };
    (plaintext, session)
}

fn set_refresh_cookie(state: &AppState, token: &str) -> SetCookie {
    let cookie = refresh_cookie(
        token,
        state.config.jwt.refresh_token_expiry_days,
        state.config.cookie_secure,
    );
    [(SET_COOKIE, cookie.to_string())]
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
