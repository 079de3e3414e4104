//! Handlers for authentication (sign-up, login, logout, current user).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use validator::Validate;
use websurvey_core::error::CoreError;
use websurvey_core::types::DbId;
use websurvey_core::validation::{required_message, FieldErrors};
use websurvey_db::models::session::CreateSession;
use websurvey_db::models::user::{CreateUser, UserResponse};
use websurvey_db::repositories::{SessionRepo, UserRepo};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Message returned for any failed login, whether the email or the password
/// was wrong.
pub const BAD_CREDENTIALS: &str = "The provided credentials are not correct";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /sign-up`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(length(min = 1, max = 55, message = "The name field must be between 1 and 55 characters."))]
    #[serde(default)]
    pub name: String,
    #[validate(email(message = "The email field must be a valid email address."))]
    #[serde(default)]
    pub email: String,
    #[validate(must_match(
        other = "password_confirmation",
        message = "The password field confirmation does not match."
    ))]
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

/// Request body for `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Issue a long-lived token.
    #[serde(default)]
    pub remember: bool,
}

/// Successful sign-up or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/sign-up
///
/// Register a user and log them in. Returns 201 with the user and a token.
pub async fn sign_up(
    State(state): State<AppState>,
    Json(input): Json<SignUpRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let email = input.email.trim().to_lowercase();

    let mut errors = sign_up_field_errors(&input);
    if errors.get("email").is_none() && UserRepo::email_exists(&state.pool, &email).await? {
        errors.add("email", "The email has already been taken.");
    }
    errors.into_result()?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: input.name.trim().to_string(),
            email,
            password_hash,
        },
    )
    .await?;
    tracing::info!(user_id = user.id, "User signed up");

    let token = issue_session(&state, user.id, state.config.jwt.lifetime(false)).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// POST /api/login
///
/// Exchange email + password for a bearer token. Any mismatch yields 422
/// with [`BAD_CREDENTIALS`].
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let mut errors = FieldErrors::new();
    if input.email.trim().is_empty() {
        errors.add("email", required_message("email"));
    }
    if input.password.is_empty() {
        errors.add("password", required_message("password"));
    }
    errors.into_result()?;

    let user = UserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(|| AppError::Unprocessable(BAD_CREDENTIALS.into()))?;

    let valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !valid {
        tracing::debug!(user_id = user.id, "Rejected login with wrong password");
        return Err(AppError::Unprocessable(BAD_CREDENTIALS.into()));
    }

    let token = issue_session(&state, user.id, state.config.jwt.lifetime(input.remember)).await?;
    tracing::info!(user_id = user.id, remember = input.remember, "User logged in");

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// POST /api/logout
///
/// Revoke the session behind the presented token. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> AppResult<StatusCode> {
    SessionRepo::revoke(&state.pool, auth.token_id).await?;
    tracing::info!(user_id = auth.user_id, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    Ok(Json(user.into()))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sign a token and persist the session row backing it.
async fn issue_session(state: &AppState, user_id: DbId, lifetime: Duration) -> AppResult<String> {
    let issued = generate_access_token(user_id, lifetime, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id,
            token_id: issued.token_id,
            expires_at: issued.expires_at,
        },
    )
    .await?;

    Ok(issued.token)
}

/// Collect derive-based and password-strength failures into form errors.
fn sign_up_field_errors(input: &SignUpRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if input.name.trim().is_empty() {
        errors.add("name", required_message("name"));
    }
    if input.email.trim().is_empty() {
        errors.add("email", required_message("email"));
    }
    if input.password.is_empty() {
        errors.add("password", required_message("password"));
    }

    if let Err(failures) = input.validate() {
        let mut fields: Vec<_> = failures.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        for (field, list) in fields {
            let field = field.to_string();
            if errors.get(&field).is_some() {
                continue;
            }
            for e in list {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("The {field} field is invalid."));
                errors.add(field.clone(), message);
            }
        }
    }

    if !input.password.is_empty() {
        if let Err(failures) = validate_password_strength(&input.password) {
            for message in failures {
                errors.add("password", message);
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, password: &str, confirmation: &str) -> SignUpRequest {
        SignUpRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            password_confirmation: confirmation.into(),
        }
    }

    #[test]
    fn valid_sign_up_has_no_errors() {
        let input = request("Ada", "ada@example.com", "Sup3r$ecret", "Sup3r$ecret");
        assert!(sign_up_field_errors(&input).is_empty());
    }

    #[test]
    fn empty_fields_are_required() {
        let errors = sign_up_field_errors(&request("", "", "", ""));
        assert_eq!(errors.first("name"), Some("The name field is required."));
        assert_eq!(errors.first("email"), Some("The email field is required."));
        assert_eq!(
            errors.first("password"),
            Some("The password field is required.")
        );
    }

    #[test]
    fn mismatched_confirmation() {
        let input = request("Ada", "ada@example.com", "Sup3r$ecret", "different");
        let errors = sign_up_field_errors(&input);
        assert_eq!(
            errors.first("password"),
            Some("The password field confirmation does not match.")
        );
    }

    #[test]
    fn invalid_email_and_weak_password() {
        let input = request("Ada", "not-an-email", "weakpass", "weakpass");
        let errors = sign_up_field_errors(&input);
        assert_eq!(
            errors.first("email"),
            Some("The email field must be a valid email address.")
        );
        assert!(errors.get("password").is_some_and(|m| m.len() == 3));
    }
}
