use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Auth
    #[error("Unauthorized! Please provide a valid access token.")]
    AuthFail,
    #[error("User not found or password is incorrect")]
    LoginFail,
    #[error("Auth context missing")]
    AuthFailCtxNotInRequestExt,

    // Validation
    #[error("Invalid id")]
    InvalidId,
    #[error("Query parameter '{0}' must be a number.")]
    InvalidQueryNumber(&'static str),
    #[error("Message must be between 5 and 140 characters")]
    MessageOutOfBounds,

    // Conflicts (reported as plain client errors, not structured conflicts)
    #[error("Failed to create user. Please check your input.")]
    SignupFail,
    #[error("You have already liked this thought")]
    AlreadyLiked,

    #[error("{0}")]
    NotFound(&'static str),

    #[error(transparent)]
    Store(#[from] sqlx::Error),

    #[error("Internal server error")]
    Internal(String),
}

pub type Result<T> = core::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::AuthFail | Error::LoginFail => StatusCode::UNAUTHORIZED,
            Error::InvalidId
            | Error::InvalidQueryNumber(_)
            | Error::MessageOutOfBounds
            | Error::SignupFail
            | Error::AlreadyLiked => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::AuthFailCtxNotInRequestExt | Error::Store(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Store errors carry internal detail; log them and answer opaquely.
        let message = match &self {
            Error::Store(e) => {
                error!("store error: {e}");
                "Internal server error".to_string()
            }
            Error::Internal(detail) => {
                error!("internal error: {detail}");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let mut body = json!({
            "success": false,
            "response": null,
            "message": message,
        });
        // Lets clients tell "not logged in" apart from other rejections.
        if matches!(self, Error::AuthFail) {
            body["loggedOut"] = json!(true);
        }

        (status, Json(body)).into_response()
    }
}

impl From<bcrypt::BcryptError> for Error {
    fn from(err: bcrypt::BcryptError) -> Self {
        Error::Internal(err.to_string())
    }
}
