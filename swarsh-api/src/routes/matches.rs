use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use swarsh_shared::errors::{AppError, AppResult};
use swarsh_shared::types::auth::AuthUser;
use swarsh_shared::types::ApiResponse;

use crate::models::{Match, PublicUser, User};
use crate::schema::users;
use crate::services::match_service;
use crate::AppState;

/// Expanded match shape: the row plus the resolved other participant.
#[derive(Debug, Serialize)]
pub struct MatchView {
    pub id: Uuid,
    pub photo_id: Uuid,
    pub partner: PublicUser,
    pub created_at: DateTime<Utc>,
}

impl MatchView {
    pub fn new(m: &Match, viewer_id: Uuid, partner: &User) -> Self {
        debug_assert_eq!(m.other_user(viewer_id), partner.id);
        Self {
            id: m.id,
            photo_id: m.photo_id,
            partner: PublicUser::from(partner),
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MatchListResponse {
    pub matches: Vec<MatchView>,
    pub current_user_id: Uuid,
}

/// GET /match - all of the caller's matches with resolved partners.
pub async fn list_matches(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<MatchListResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let rows = match_service::matches_for_user(&mut conn, user.id)?;

    let partner_ids: Vec<Uuid> = rows.iter().map(|m| m.other_user(user.id)).collect();
    let partners: Vec<User> = users::table
        .filter(users::id.eq_any(&partner_ids))
        .load(&mut conn)?;

    let views = rows
        .iter()
        .filter_map(|m| {
            let partner_id = m.other_user(user.id);
            partners
                .iter()
                .find(|u| u.id == partner_id)
                .map(|partner| MatchView::new(m, user.id, partner))
        })
        .collect();

    Ok(Json(ApiResponse::ok(MatchListResponse {
        matches: views,
        current_user_id: user.id,
    })))
}
