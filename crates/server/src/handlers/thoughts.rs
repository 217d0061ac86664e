//! Thought handlers: listing, CRUD, and likes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::config::AppState;
use crate::ctx::Ctx;
use crate::error::{Error, Result};
use crate::models::message_in_bounds;
use crate::store::HeartFilter;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Exact heart count
    pub hearts: Option<String>,
    /// Minimum heart count
    #[serde(rename = "minLikes")]
    pub min_likes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LikedQuery {
    #[serde(rename = "minLikes")]
    pub min_likes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

/// GET /thoughts
///
/// At most one of `hearts` / `minLikes` is meaningful; when both are given
/// the minimum-count filter wins, matching the historical behavior. An
/// empty result set is a 404 with an empty response array, not a 200.
pub async fn list_thoughts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let mut filter = HeartFilter::Any;
    if let Some(hearts) = &query.hearts {
        filter = HeartFilter::Exact(parse_count(hearts, "hearts")?);
    }
    if let Some(min) = &query.min_likes {
        filter = HeartFilter::AtLeast(parse_count(min, "minLikes")?);
    }

    let thoughts = state.thoughts.list(filter).await?;

    if thoughts.is_empty() {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "response": [],
                "message": "No thoughts found for that query. Please try another one",
            })),
        )
            .into_response());
    }

    Ok(Json(json!({ "success": true, "response": thoughts })).into_response())
}

/// GET /thoughts/{id}
pub async fn get_thought(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    parse_id(&id)?;

    let thought = state
        .thoughts
        .get(&id)
        .await?
        .ok_or(Error::NotFound("Thought not found"))?;

    Ok(Json(json!({ "success": true, "response": thought })))
}

/// POST /thoughts
pub async fn create_thought(
    ctx: Ctx,
    State(state): State<AppState>,
    Json(body): Json<MessageBody>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    info!("POST /thoughts - user {}", ctx.user_id());

    if !message_in_bounds(&body.message) {
        return Err(Error::MessageOutOfBounds);
    }

    let thought = state.thoughts.create(ctx.user_id(), body.message).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "response": thought,
            "message": "Thought was successfully created",
        })),
    ))
}

/// PATCH /thoughts/{id}/like
pub async fn like_thought(
    ctx: Ctx,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    parse_id(&id)?;

    let thought = state.thoughts.like(ctx.user_id(), &id).await?;

    Ok(Json(json!({
        "success": true,
        "response": thought,
        "message": "Updated",
    })))
}

/// PATCH /thoughts/{id}/edit
pub async fn edit_thought(
    ctx: Ctx,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<MessageBody>,
) -> Result<Json<serde_json::Value>> {
    parse_id(&id)?;

    if !message_in_bounds(&body.message) {
        return Err(Error::MessageOutOfBounds);
    }

    let thought = state
        .thoughts
        .update_message(&id, ctx.user_id(), body.message)
        .await?;

    Ok(Json(json!({
        "success": true,
        "response": thought,
        "message": "Updated",
    })))
}

/// DELETE /thoughts/{id}
pub async fn delete_thought(
    ctx: Ctx,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    parse_id(&id)?;

    let thought = state.thoughts.delete(&id, ctx.user_id()).await?;

    Ok(Json(json!({
        "success": true,
        "response": thought,
        "message": "Was successfully deleted",
    })))
}

/// GET /thoughts/liked
///
/// Unlike the public listing, an empty result here is a plain 200 with an
/// empty array — a fresh user simply hasn't liked anything yet.
pub async fn liked_thoughts(
    ctx: Ctx,
    State(state): State<AppState>,
    Query(query): Query<LikedQuery>,
) -> Result<Json<serde_json::Value>> {
    let min = match &query.min_likes {
        Some(raw) => Some(parse_count(raw, "minLikes")?),
        None => None,
    };

    let thoughts = state.thoughts.liked_by(ctx.user_id(), min).await?;

    Ok(Json(json!({ "success": true, "response": thoughts })))
}

fn parse_id(id: &str) -> Result<()> {
    Uuid::parse_str(id).map_err(|_| Error::InvalidId)?;
    Ok(())
}

fn parse_count(raw: &str, param: &'static str) -> Result<i64> {
    raw.parse().map_err(|_| Error::InvalidQueryNumber(param))
}
