use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use memoria_auth::AuthError;
use memoria_models::Authentication;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn map_auth_error(err: AuthError) -> ApiError {
    let (status, code) = match &err {
        AuthError::AccessDenied => (StatusCode::UNAUTHORIZED, "access_denied"),
        AuthError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        AuthError::Conflict(_) => (StatusCode::BAD_REQUEST, "conflict"),
        AuthError::InvalidToken => (StatusCode::BAD_REQUEST, "invalid_token"),
        AuthError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, "invalid_argument"),
        AuthError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    };
    (status, Json(ErrorResponse::new(code, &err.to_string())))
}

fn bad_request(err: &impl std::fmt::Display) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("invalid_argument", &err.to_string())),
    )
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    pub identifier: Uuid,

    #[validate(length(min = 1, max = 128))]
    pub credential: String,
}

/// Issue a fresh access/refresh pair for a verified credential
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Authentication>, ApiError> {
    request.validate().map_err(|e| bad_request(&e))?;

    match state.auth_service.login(request.identifier, &request.credential).await {
        Ok(authentication) => Ok(Json(authentication)),
        Err(e @ (AuthError::AccessDenied | AuthError::NotFound(_))) => {
            // Don't reveal whether the identifier exists
            tracing::warn!(identifier = %request.identifier, "login rejected: {}", e);
            Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new(
                    "invalid_credentials",
                    "Invalid identifier or credential",
                )),
            ))
        }
        Err(e) => Err(map_auth_error(e)),
    }
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub identifier: Uuid,
}

/// Destroy a session row
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LogoutRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .auth_service
        .logout(request.identifier)
        .await
        .map_err(map_auth_error)?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(length(min = 1))]
    pub token: String,

    pub token_type: String,
}

#[derive(Debug, Serialize)]
pub struct IntrospectResponse {
    pub active: bool,
}

/// Liveness check for a raw secret
pub async fn introspect(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<IntrospectResponse>, ApiError> {
    request.validate().map_err(|e| bad_request(&e))?;

    let active = state
        .auth_service
        .introspect(&request.token, &request.token_type)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(IntrospectResponse { active }))
}

/// Exchange a refresh secret for a new pair
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<Authentication>, ApiError> {
    request.validate().map_err(|e| bad_request(&e))?;

    let authentication = state
        .auth_service
        .refresh(&request.token, &request.token_type)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(authentication))
}

/// Clear the slot holding a secret
pub async fn revoke(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TokenRequest>,
) -> Result<StatusCode, ApiError> {
    request.validate().map_err(|e| bad_request(&e))?;

    state
        .auth_service
        .revoke(&request.token, &request.token_type)
        .await
        .map_err(map_auth_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Fetch a session aggregate; raw secrets are never recoverable
pub async fn session(
    State(state): State<Arc<AppState>>,
    Path(identifier): Path<Uuid>,
) -> Result<Json<Authentication>, ApiError> {
    let authentication = state
        .auth_service
        .find(identifier)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(authentication))
}
