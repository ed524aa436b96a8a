use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use swarsh_shared::errors::{AppError, AppResult, ErrorCode};
use swarsh_shared::types::auth::AuthUser;
use swarsh_shared::types::ApiResponse;

use crate::models::{OwnProfile, Preferences, PublicUser, UpdateProfile, User, UserSettings};
use crate::schema::users;
use crate::AppState;

// --- GET /me ---

pub async fn get_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<OwnProfile>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let row: User = users::table
        .find(user.id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    Ok(Json(ApiResponse::ok(OwnProfile::from(&row))))
}

// --- PATCH /me ---

pub async fn update_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateProfile>,
) -> AppResult<Json<ApiResponse<OwnProfile>>> {
    if let Some(age) = payload.age {
        if !(18..=120).contains(&age) {
            return Err(AppError::new(ErrorCode::ValidationError, "age must be between 18 and 120"));
        }
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let updated: User = diesel::update(users::table.find(user.id))
        .set((
            &payload,
            users::updated_at.eq(chrono::Utc::now()),
        ))
        .get_result(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    Ok(Json(ApiResponse::ok(OwnProfile::from(&updated))))
}

// --- PUT /me/preferences ---

pub async fn update_preferences(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Preferences>,
) -> AppResult<Json<ApiResponse<OwnProfile>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let preferences_json = serde_json::to_value(&payload)
        .map_err(|e| AppError::internal(e.to_string()))?;

    let updated: User = diesel::update(users::table.find(user.id))
        .set((
            users::preferences.eq(&preferences_json),
            users::updated_at.eq(chrono::Utc::now()),
        ))
        .get_result(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    Ok(Json(ApiResponse::ok(OwnProfile::from(&updated))))
}

// --- PUT /me/settings ---

pub async fn update_settings(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UserSettings>,
) -> AppResult<Json<ApiResponse<OwnProfile>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let settings_json = serde_json::to_value(&payload)
        .map_err(|e| AppError::internal(e.to_string()))?;

    let updated: User = diesel::update(users::table.find(user.id))
        .set((
            users::settings.eq(&settings_json),
            users::updated_at.eq(chrono::Utc::now()),
        ))
        .get_result(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    Ok(Json(ApiResponse::ok(OwnProfile::from(&updated))))
}

// --- GET /users/:id ---

pub async fn get_public_profile(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PublicUser>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let row: User = users::table
        .find(user_id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    Ok(Json(ApiResponse::ok(PublicUser::from(&row))))
}
