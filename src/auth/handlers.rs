use axum::{
    extract::State,
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use tracing::instrument;

use crate::auth::{
    dto::{
        ActivateRequest, AuthenticateRequest, RegisterRequest, TokenResponse, UserResponse,
        VerifyRequest, VerifyResponse,
    },
    errors::AuthError,
};
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/activated", put(activate))
        .route("/tokens/authentication", post(authenticate))
        .route("/tokens/verify", post(verify_token))
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AuthError> {
    let user = state
        .auth
        .register(&payload.name, &payload.email, &payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
async fn activate(
    State(state): State<AppState>,
    Json(payload): Json<ActivateRequest>,
) -> Result<Json<UserResponse>, AuthError> {
    let user = state.auth.activate(&payload.token).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
async fn authenticate(
    State(state): State<AppState>,
    Json(payload): Json<AuthenticateRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AuthError> {
    let token = state
        .auth
        .authenticate(&payload.email, &payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(token.into())))
}

#[instrument(skip(state, payload))]
async fn verify_token(
    State(state): State<AppState>,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, AuthError> {
    let identity = state.auth.verify_token(&payload.token).await?;
    Ok(Json(identity.into()))
}
