use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use swarsh_shared::errors::{AppError, AppResult, ErrorCode};
use swarsh_shared::types::auth::AuthUser;
use swarsh_shared::types::ApiResponse;

use crate::models::{Photo, PublicUser, User};
use crate::schema::{photos, users};
use crate::services::pairing_service;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct InviteResponse {
    pub token: String,
}

/// POST /invite/generate - issue a fresh single-use invite token.
pub async fn generate_invite(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<InviteResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let token = pairing_service::issue_invite(&mut conn, user.id)?;

    Ok(Json(ApiResponse::ok(InviteResponse { token })))
}

#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub token: String,
}

/// POST /invite/redeem - pair the caller with the token's owner.
pub async fn redeem_invite(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<RedeemRequest>,
) -> AppResult<Json<ApiResponse<PublicUser>>> {
    if req.token.trim().is_empty() {
        return Err(AppError::new(ErrorCode::ValidationError, "token must not be empty"));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let partner = pairing_service::redeem_invite(&mut conn, user.id, req.token.trim())?;

    Ok(Json(ApiResponse::ok(PublicUser::from(&partner))))
}

/// Expanded pairing shape: the partner and their photos.
#[derive(Debug, Serialize)]
pub struct PartnerView {
    pub partner: PublicUser,
    pub photos: Vec<Photo>,
}

/// GET /pairing/partner - paired users read their partner directly; the
/// swipe flow does not apply to them.
pub async fn get_partner(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<PartnerView>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let me: User = users::table
        .find(user.id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "user not found"))?;

    let partner_id = me
        .paired_with
        .ok_or_else(|| AppError::new(ErrorCode::NotPaired, "you are not paired"))?;

    let partner: User = users::table
        .find(partner_id)
        .first(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::UserNotFound, "partner not found"))?;

    let partner_photos: Vec<Photo> = photos::table
        .filter(photos::owner_id.eq(partner_id))
        .order(photos::created_at.asc())
        .load(&mut conn)?;

    Ok(Json(ApiResponse::ok(PartnerView {
        partner: PublicUser::from(&partner),
        photos: partner_photos,
    })))
}
