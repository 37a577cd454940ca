//! Handlers for the `/auth` resource (register, login, refresh, logout, me).

use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use orta_core::error::CoreError;
use orta_core::roles::ROLE_CLIENT;
use orta_core::types::DbId;
use orta_core::validation::{validate_email, validate_login_identifier, validate_phone};
use orta_db::models::session::CreateSession;
use orta_db::models::user::{CreateUser, User, UserResponse};
use orta_db::repositories::{SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client_ip::ClientIp;
use crate::response::DataResponse;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Credenciales inválidas";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Defaults to the email address.
    pub username: Option<String>,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    pub login: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    /// Revoke just this session; all of the user's sessions when absent.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_staff: user.is_staff(),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let email = validate_email(&input.email)?;
    let username = match input.username.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => email.clone(),
    };
    validate_login_identifier(&username)?;
    let phone = match input.phone.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => Some(validate_phone(p)?),
        _ => None,
    };

    validate_password_strength(&input.password, &[&username, &email])
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Ya existe una cuenta con este email".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username,
            email,
            password_hash,
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            phone,
            role: ROLE_CLIENT.to_string(),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(&user),
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Repeated failures lock the account for the configured lockout period;
/// attempts against a locked account get 429 with `retry_after`.
pub async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    validate_login_identifier(&input.login)?;

    let user = UserRepo::find_by_login(&state.pool, input.login.trim())
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "La cuenta está desactivada".into(),
        )));
    }

    let now = Utc::now();
    match user.locked_until {
        Some(until) if until > now => {
            let retry_after_secs = u64::try_from((until - now).num_seconds()).unwrap_or(1);
            return Err(AppError::TooManyRequests {
                retry_after_secs: retry_after_secs.max(1),
            });
        }
        // Lock expired: start counting afresh.
        Some(_) => UserRepo::unlock(&state.pool, user.id).await?,
        None => {}
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        let failures = UserRepo::record_failed_login(&state.pool, user.id).await?;
        let limits = &state.config.rate_limit;
        if failures >= limits.login_max_attempts {
            UserRepo::lock_account(
                &state.pool,
                user.id,
                now + Duration::seconds(limits.login_lockout_secs),
            )
            .await?;
            tracing::warn!(user_id = user.id, ip = %ip, failures, "Account locked after failed logins");
            return Err(AppError::TooManyRequests {
                retry_after_secs: u64::try_from(limits.login_lockout_secs).unwrap_or(1),
            });
        }
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, ip = %ip, "User logged in");

    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let response = issue_tokens(&state, &user, user_agent, Some(ip)).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a refresh token for new tokens. The old session is revoked.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let hash = hash_refresh_token(&input.refresh_token);
    let session = SessionRepo::find_by_refresh_hash(&state.pool, &hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    SessionRepo::revoke(&state.pool, session.id).await?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "La cuenta está desactivada".into(),
        )));
    }

    let response = issue_tokens(&state, &user, session.user_agent, session.ip_address).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<LogoutRequest>,
) -> AppResult<StatusCode> {
    match input.refresh_token {
        Some(token) => {
            let hash = hash_refresh_token(&token);
            if let Some(session) = SessionRepo::find_by_refresh_hash(&state.pool, &hash).await? {
                if session.user_id == auth_user.user_id {
                    SessionRepo::revoke(&state.pool, session.id).await?;
                }
            }
        }
        None => {
            SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
        }
    }
    tracing::info!(user_id = auth_user.user_id, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sign an access token, persist a refresh session, and build the response.
async fn issue_tokens(
    state: &AppState,
    user: &User,
    user_agent: Option<String>,
    ip_address: Option<String>,
) -> AppResult<AuthResponse> {
    let jwt = &state.config.jwt;
    let access_token = generate_access_token(user.id, &user.role, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_token, refresh_hash) = generate_refresh_token();
    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh_hash,
            expires_at: jwt.refresh_expires_at(),
            user_agent,
            ip_address,
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token,
        expires_in: jwt.access_expires_in(),
        user: UserInfo::from(user),
    })
}
