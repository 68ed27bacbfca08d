use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::modules::auth::{
    crud::{TokenCrud, UserCrud},
    extractor::CurrentUser,
    model::{TokenKind, User},
    schema::{
        EmailRequest, LoginRequest, LoginResponse, NewPasswordRequest, RegisterRequest,
        SettingsRequest, TokenRequest, UserEnvelope, UserResponse, UsernameAvailability,
        UsernameQuery, UsernameRequest, UsernameSessionResponse,
    },
};
use crate::response::SuccessResponse;
use crate::services::{hashing, tokens};
use crate::AppState;

type SetCookie = [(header::HeaderName, header::HeaderValue); 1];

// =============================================================================
// REGISTER
// =============================================================================

pub async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, SetCookie, Json<SuccessResponse>)> {
    req.validate()?;

    let users = UserCrud::new(state.db.clone());

    if users.email_exists(&req.email).await? {
        return Err(ApiError::conflict("Email already in use!"));
    }

    // The username may have been picked on the landing page before sign up.
    let username = match req.username {
        Some(username) => Some(username),
        None => state.username_session.read(&headers),
    };

    if let Some(username) = &username {
        if users.username_exists(username).await? {
            return Err(ApiError::conflict("Username already in use!"));
        }
    }

    let password_hash = hashing::hash_password(&req.password)?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: Some(req.name),
        email: req.email,
        email_verified: None,
        password_hash: Some(password_hash),
        username,
        image: None,
        two_factor_enabled: false,
        created_at: now,
        updated_at: now,
    };

    users.create_with_page(&user).await?;
    tracing::info!(user_id = %user.id, "User registered");

    let token = TokenCrud::new(state.db.clone())
        .issue(TokenKind::Verification, &user.email)
        .await?;
    state
        .deliver(state.mail_templates.verification(
            &user.email,
            &token.token,
            req.callback_url.as_deref(),
        ))
        .await?;

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, state.username_session.clear_cookie())],
        Json(SuccessResponse::message("Confirmation email sent!")),
    ))
}

// =============================================================================
// USERNAME
// =============================================================================

pub async fn check_username(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UsernameQuery>,
) -> ApiResult<Json<UsernameAvailability>> {
    UsernameRequest {
        username: query.username.clone(),
    }
    .validate()?;

    let taken = UserCrud::new(state.db.clone())
        .username_exists(&query.username)
        .await?;

    Ok(Json(if taken {
        UsernameAvailability {
            available: false,
            message: "Username already in use!",
        }
    } else {
        UsernameAvailability {
            available: true,
            message: "You can use this username!",
        }
    }))
}

pub async fn save_username_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UsernameRequest>,
) -> ApiResult<(SetCookie, Json<SuccessResponse<UsernameSessionResponse>>)> {
    req.validate()?;

    if UserCrud::new(state.db.clone())
        .username_exists(&req.username)
        .await?
    {
        return Err(ApiError::conflict("Username already in use!"));
    }

    Ok((
        [(header::SET_COOKIE, state.username_session.set_cookie(&req.username))],
        Json(SuccessResponse::with(
            "You can use this username!",
            UsernameSessionResponse {
                username: Some(req.username),
            },
        )),
    ))
}

pub async fn read_username_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<UsernameSessionResponse> {
    Json(UsernameSessionResponse {
        username: state.username_session.read(&headers),
    })
}

pub async fn clear_username_session(
    State(state): State<Arc<AppState>>,
) -> (SetCookie, StatusCode) {
    (
        [(header::SET_COOKIE, state.username_session.clear_cookie())],
        StatusCode::NO_CONTENT,
    )
}

pub async fn set_username(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(req): Json<UsernameRequest>,
) -> ApiResult<Json<SuccessResponse<UserEnvelope>>> {
    req.validate()?;

    let users = UserCrud::new(state.db.clone());
    let user = users
        .find_by_id(&current.id)
        .await?
        .ok_or_else(ApiError::unauthorized)?;

    if user.username.is_some() {
        return Err(ApiError::conflict("You already have a username!"));
    }

    if users.username_exists(&req.username).await? {
        return Err(ApiError::conflict("Username already exists!"));
    }

    if !users.claim_username(&user.id, &req.username).await? {
        return Err(ApiError::conflict("You already have a username!"));
    }

    let user = users
        .find_by_id(&current.id)
        .await?
        .ok_or_else(ApiError::unauthorized)?;

    Ok(Json(SuccessResponse::with(
        "Your username added successfully!",
        UserEnvelope {
            user: UserResponse::from(&user),
        },
    )))
}

// =============================================================================
// LOGIN
// =============================================================================

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let users = UserCrud::new(state.db.clone());
    let token_crud = TokenCrud::new(state.db.clone());

    let user = users
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| ApiError::not_found("Email does not exist!"))?;

    let password_hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| ApiError::not_found("Email does not exist!"))?;

    if !hashing::verify_password(&req.password, password_hash)? {
        return Err(ApiError::Unauthorized("Invalid credentials!".to_string()));
    }

    if user.email_verified.is_none() {
        let token = token_crud.issue(TokenKind::Verification, &user.email).await?;
        state
            .deliver(state.mail_templates.verification(&user.email, &token.token, None))
            .await?;

        return Ok(Json(LoginResponse::VerificationSent {
            success: "Confirmation email sent!",
        }));
    }

    if user.two_factor_enabled {
        match req.code.as_deref().filter(|code| !code.is_empty()) {
            Some(code) => {
                let two_factor_token = token_crud
                    .find_by_email(TokenKind::TwoFactor, &user.email)
                    .await?
                    .ok_or_else(|| ApiError::Unauthorized("Invalid code!".to_string()))?;

                if two_factor_token.token != code {
                    let attempts = token_crud.record_failed_attempt(&two_factor_token.id).await?;
                    if attempts >= tokens::MAX_TWO_FACTOR_ATTEMPTS {
                        token_crud
                            .consume(TokenKind::TwoFactor, &two_factor_token.id)
                            .await?;
                        tracing::warn!(user_id = %user.id, "Two-factor code discarded after failed attempts");
                        return Err(ApiError::Unauthorized(
                            "Too many attempts! Sign in again for a new code.".to_string(),
                        ));
                    }
                    return Err(ApiError::Unauthorized("Invalid code!".to_string()));
                }

                if tokens::has_expired(two_factor_token.expires_at) {
                    return Err(ApiError::gone("Code expired!"));
                }

                if !token_crud
                    .consume(TokenKind::TwoFactor, &two_factor_token.id)
                    .await?
                {
                    return Err(ApiError::Unauthorized("Invalid code!".to_string()));
                }

                token_crud.replace_confirmation(&user.id).await?;
            }
            None => {
                let two_factor_token = token_crud.issue(TokenKind::TwoFactor, &user.email).await?;
                state
                    .deliver(
                        state
                            .mail_templates
                            .two_factor_code(&user.email, &two_factor_token.token),
                    )
                    .await?;

                return Ok(Json(LoginResponse::TwoFactorRequired { two_factor: true }));
            }
        }

        if !token_crud.take_confirmation(&user.id).await? {
            return Err(ApiError::unauthorized());
        }
    }

    let access_token = state.jwt_service.create_session_token(
        &user.id,
        &user.email,
        user.username.as_deref(),
    )?;

    tracing::info!(user_id = %user.id, "User signed in");

    Ok(Json(LoginResponse::Session {
        success: "Logged in!",
        access_token,
        token_type: "Bearer",
        expires_in: state.jwt_service.session_duration_secs(),
        user: UserResponse::from(&user),
    }))
}

// =============================================================================
// EMAIL VERIFICATION
// =============================================================================

pub async fn send_verification(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmailRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    req.validate()?;

    let user = UserCrud::new(state.db.clone())
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| ApiError::not_found("Email does not exist!"))?;

    let token_crud = TokenCrud::new(state.db.clone());

    let token = match token_crud
        .find_by_email(TokenKind::Verification, &user.email)
        .await?
    {
        Some(existing) if !tokens::has_expired(existing.expires_at) => existing,
        _ => token_crud.issue(TokenKind::Verification, &user.email).await?,
    };

    state
        .deliver(state.mail_templates.verification(&user.email, &token.token, None))
        .await?;

    Ok(Json(SuccessResponse::message("Verification email sent!")))
}

pub async fn new_verification(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TokenRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    req.validate()?;

    let token_crud = TokenCrud::new(state.db.clone());

    let token = token_crud
        .find_by_token(TokenKind::Verification, &req.token)
        .await?
        .ok_or_else(|| ApiError::not_found("Token does not exist!"))?;

    if tokens::has_expired(token.expires_at) {
        return Err(ApiError::gone("Token has expired!"));
    }

    let users = UserCrud::new(state.db.clone());

    let user = match token.user_id.as_deref() {
        Some(user_id) => users.find_by_id(user_id).await?,
        None => users.find_by_email(&token.email).await?,
    }
    .ok_or_else(|| ApiError::not_found("Email does not exist!"))?;

    if !token_crud.consume(TokenKind::Verification, &token.id).await? {
        return Err(ApiError::not_found("Token does not exist!"));
    }

    users.mark_email_verified(&user.id, &token.email).await?;

    tracing::info!(user_id = %user.id, "Email verified");

    Ok(Json(SuccessResponse::message("Email verified!")))
}

// =============================================================================
// PASSWORD RESET
// =============================================================================

pub async fn reset(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmailRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    req.validate()?;

    let user = UserCrud::new(state.db.clone())
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| ApiError::not_found("Email not found!"))?;

    let token = TokenCrud::new(state.db.clone())
        .issue(TokenKind::PasswordReset, &user.email)
        .await?;

    state
        .deliver(state.mail_templates.password_reset(&user.email, &token.token))
        .await?;

    Ok(Json(SuccessResponse::message("Reset email sent!")))
}

pub async fn new_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewPasswordRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    req.validate()?;

    let token_crud = TokenCrud::new(state.db.clone());

    let token = token_crud
        .find_by_token(TokenKind::PasswordReset, &req.token)
        .await?
        .ok_or_else(|| ApiError::not_found("Token does not exist!"))?;

    if tokens::has_expired(token.expires_at) {
        return Err(ApiError::gone("Token has expired!"));
    }

    let users = UserCrud::new(state.db.clone());
    let user = users
        .find_by_email(&token.email)
        .await?
        .ok_or_else(|| ApiError::not_found("Email does not exist!"))?;

    if !token_crud.consume(TokenKind::PasswordReset, &token.id).await? {
        return Err(ApiError::not_found("Token does not exist!"));
    }

    let password_hash = hashing::hash_password(&req.password)?;
    users.update_password(&user.id, &password_hash).await?;

    tracing::info!(user_id = %user.id, "Password reset");

    Ok(Json(SuccessResponse::message("Password updated!")))
}

// =============================================================================
// CURRENT USER
// =============================================================================

pub async fn me(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> ApiResult<Json<UserEnvelope>> {
    let user = UserCrud::new(state.db.clone())
        .find_by_id(&current.id)
        .await?
        .ok_or_else(ApiError::unauthorized)?;

    Ok(Json(UserEnvelope {
        user: UserResponse::from(&user),
    }))
}

pub async fn settings(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(mut req): Json<SettingsRequest>,
) -> ApiResult<Json<SuccessResponse<UserEnvelope>>> {
    req.validate()?;

    let users = UserCrud::new(state.db.clone());
    let user = users
        .find_by_id(&current.id)
        .await?
        .ok_or_else(ApiError::unauthorized)?;

    if user.is_oauth() {
        req.email = None;
        req.password = None;
        req.new_password = None;
        req.two_factor_enabled = None;
    }

    if let Some(email) = req.email.as_deref().filter(|email| *email != user.email) {
        if let Some(existing) = users.find_by_email(email).await? {
            if existing.id != user.id {
                return Err(ApiError::conflict("Email already in use!"));
            }
        }

        let token = TokenCrud::new(state.db.clone())
            .issue_for(TokenKind::Verification, email, Some(&user.id))
            .await?;
        state
            .deliver(state.mail_templates.verification(email, &token.token, None))
            .await?;

        return Ok(Json(SuccessResponse::with(
            "Verification email sent!",
            UserEnvelope {
                user: UserResponse::from(&user),
            },
        )));
    }

    match (req.password.as_deref(), req.new_password.as_deref()) {
        (Some(password), Some(new_password)) => {
            let current_hash = user
                .password_hash
                .as_deref()
                .ok_or_else(ApiError::unauthorized)?;

            if !hashing::verify_password(password, current_hash)? {
                return Err(ApiError::field("password", "Incorrect password!"));
            }

            let password_hash = hashing::hash_password(new_password)?;
            users.update_password(&user.id, &password_hash).await?;
        }
        (Some(_), None) => {
            return Err(ApiError::field("new_password", "New password is required!"));
        }
        (None, Some(_)) => {
            return Err(ApiError::field("password", "Password is required!"));
        }
        (None, None) => {}
    }

    users
        .update_settings(&user.id, req.name.as_deref(), req.two_factor_enabled)
        .await?;

    let user = users
        .find_by_id(&user.id)
        .await?
        .ok_or_else(ApiError::unauthorized)?;

    Ok(Json(SuccessResponse::with(
        "Settings Updated!",
        UserEnvelope {
            user: UserResponse::from(&user),
        },
    )))
}
