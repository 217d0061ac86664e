use crate::config::AppState;
use crate::ctx::Ctx;
use crate::error::{Error, Result};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Resolve the raw Authorization header value against the credential store.
///
/// The token is the whole header value, compared by exact match — there is
/// no Bearer prefix in this scheme. A missing, malformed, or unknown token
/// is one and the same rejection.
pub async fn mw_require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    debug!("MIDDLEWARE: require_auth");

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(Error::AuthFail)?;

    let user = state.auth.user_for_token(token).await?;

    req.extensions_mut().insert(Ctx::new(user.id));

    Ok(next.run(req).await)
}
