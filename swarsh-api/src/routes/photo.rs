use axum::extract::{Path, State};
use axum::Json;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Double;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use swarsh_shared::errors::{AppError, AppResult, ErrorCode};
use swarsh_shared::types::auth::AuthUser;
use swarsh_shared::types::ApiResponse;

use crate::models::{NewPhoto, Photo, PublicUser, User};
use crate::schema::{photos, users};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AddPhotoRequest {
    pub url: String,
    pub caption: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// POST /photos - record an uploaded photo. The file itself lives on the
/// external image host; only the metadata lands here.
pub async fn add_photo(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddPhotoRequest>,
) -> AppResult<Json<ApiResponse<Photo>>> {
    if req.url.trim().is_empty() {
        return Err(AppError::new(ErrorCode::ValidationError, "photo url must not be empty"));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let tags_json = serde_json::to_value(&req.tags)
        .map_err(|e| AppError::internal(e.to_string()))?;

    let new_photo = NewPhoto {
        owner_id: user.id,
        url: req.url,
        caption: req.caption,
        tags: tags_json,
    };

    let photo: Photo = diesel::insert_into(photos::table)
        .values(&new_photo)
        .get_result(&mut conn)?;

    tracing::info!(photo_id = %photo.id, owner = %user.id, "photo recorded");

    Ok(Json(ApiResponse::ok(photo)))
}

/// GET /users/:id/photos - a user's photos in upload order.
pub async fn list_photos(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Photo>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let owner_exists: bool = users::table
        .find(user_id)
        .count()
        .get_result::<i64>(&mut conn)
        .map(|c| c > 0)
        .unwrap_or(false);
    if !owner_exists {
        return Err(AppError::new(ErrorCode::UserNotFound, "user not found"));
    }

    let rows: Vec<Photo> = photos::table
        .filter(photos::owner_id.eq(user_id))
        .order(photos::created_at.asc())
        .load(&mut conn)?;

    Ok(Json(ApiResponse::ok(rows)))
}

/// What `/explore` serves: a swipe candidate for unpaired users, the
/// partner's photo for paired ones. Two distinct shapes, never one
/// ambiguous record.
#[derive(Debug, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExploreView {
    Candidate { photo: Photo, owner: PublicUser },
    Partner { photo: Photo, partner: PublicUser },
}

/// GET /explore - the discovery read. Paired users bypass swiping entirely
/// and read their partner's latest photo.
pub async fn explore(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<ExploreView>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let me: User = users::table
        .find(user.id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    if let Some(partner_id) = me.paired_with {
        let partner: User = users::table
            .find(partner_id)
            .first(&mut conn)
            .map_err(|_| AppError::new(ErrorCode::UserNotFound, "partner not found"))?;

        let photo: Photo = photos::table
            .filter(photos::owner_id.eq(partner_id))
            .order(photos::created_at.desc())
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::PhotoNotFound, "your partner has no photos yet"))?;

        return Ok(Json(ApiResponse::ok(ExploreView::Partner {
            photo,
            partner: PublicUser::from(&partner),
        })));
    }

    let photo: Photo = photos::table
        .filter(photos::owner_id.ne(user.id))
        .order(sql::<Double>("RANDOM()"))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::PhotoNotFound, "no photos to explore yet"))?;

    let owner: User = users::table
        .find(photo.owner_id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "photo owner not found"))?;

    Ok(Json(ApiResponse::ok(ExploreView::Candidate {
        photo,
        owner: PublicUser::from(&owner),
    })))
}
