use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use swarsh_shared::errors::{AppError, AppResult, ErrorCode};
use swarsh_shared::types::auth::AuthUser;
use swarsh_shared::types::ApiResponse;

use crate::models::{NewSwipe, Photo, SwipeDirection, User};
use crate::routes::matches::MatchView;
use crate::schema::{photos, swipes, users};
use crate::services::match_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SwipeRequest {
    pub photo_id: Uuid,
    pub photo_owner_id: Uuid,
    pub direction: SwipeDirection,
}

#[derive(Debug, Serialize)]
pub struct SwipeResponse {
    pub matched: bool,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_view: Option<MatchView>,
}

/// POST /swipe - append to the swipe ledger and run match detection.
///
/// The swipe is recorded unconditionally. On a like, reciprocity against the
/// owner's latest swipes decides whether the pair's match row is created (or
/// an existing one returned), and a fresh match is pushed to both users.
pub async fn record_swipe(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SwipeRequest>,
) -> AppResult<Json<ApiResponse<SwipeResponse>>> {
    if req.photo_owner_id == user.id {
        return Err(AppError::new(ErrorCode::CannotSwipeSelf, "you cannot swipe on your own photo"));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let owner: User = users::table
        .find(req.photo_owner_id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "photo owner not found"))?;

    let photo: Photo = photos::table
        .find(req.photo_id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::PhotoNotFound, "photo not found"))?;

    if photo.owner_id != owner.id {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            "photo does not belong to that user",
        ));
    }

    let new_swipe = NewSwipe {
        swiper_id: user.id,
        photo_id: photo.id,
        photo_owner_id: owner.id,
        direction: req.direction.to_string(),
    };
    diesel::insert_into(swipes::table)
        .values(&new_swipe)
        .execute(&mut conn)?;

    if req.direction != SwipeDirection::Like {
        return Ok(Json(ApiResponse::ok(SwipeResponse {
            matched: false,
            match_view: None,
        })));
    }

    let reciprocal = match_service::reciprocal_like_exists(&mut conn, owner.id, user.id)?;
    if !reciprocal {
        return Ok(Json(ApiResponse::ok(SwipeResponse {
            matched: false,
            match_view: None,
        })));
    }

    let (match_row, created) =
        match_service::create_or_get_match(&mut conn, photo.id, user.id, owner.id)?;

    if created {
        tracing::info!(
            match_id = %match_row.id,
            user_a = %user.id,
            user_b = %owner.id,
            photo = %photo.id,
            "mutual like, match created"
        );

        let payload = serde_json::json!({
            "message": "It's a match!",
            "match": match_row,
        });
        state.notifier.notify_new_match(user.id, owner.id, &payload);
    }

    let view = MatchView::new(&match_row, user.id, &owner);

    Ok(Json(ApiResponse::ok(SwipeResponse {
        matched: true,
        match_view: Some(view),
    })))
}
