//! Account handlers: signup and login

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::config::AppState;
use crate::error::Result;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /users/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    info!("POST /users/signup - {}", req.email);

    let user = state.auth.signup(req.name, req.email, req.password).await?;

    // The access token is returned here once; there is no other way to
    // retrieve it later.
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User created successfully",
            "id": user.id,
            "accessToken": user.access_token,
        })),
    ))
}

/// POST /users/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>> {
    info!("POST /users/login - {}", req.email);

    let user = state.auth.login(req.email, req.password).await?;

    Ok(Json(json!({
        "userId": user.id,
        "accessToken": user.access_token,
    })))
}
