use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use swarsh_shared::errors::{AppError, AppResult, ErrorCode};
use swarsh_shared::types::auth::AuthUser;
use swarsh_shared::types::ApiResponse;

use crate::models::{Message, NewMessage};
use crate::schema::{messages, users};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub receiver_id: Uuid,
    pub content: String,
}

/// POST /message - persist a message, then push it to the receiver's live
/// session. An offline receiver only sees it on the next conversation fetch.
pub async fn send_message(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<Json<ApiResponse<Message>>> {
    if req.content.trim().is_empty() {
        return Err(AppError::new(ErrorCode::ValidationError, "message content must not be empty"));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let receiver_exists: bool = users::table
        .find(req.receiver_id)
        .count()
        .get_result::<i64>(&mut conn)
        .map(|c| c > 0)
        .unwrap_or(false);
    if !receiver_exists {
        return Err(AppError::new(ErrorCode::UserNotFound, "receiver not found"));
    }

    let new_message = NewMessage {
        sender_id: user.id,
        receiver_id: req.receiver_id,
        content: req.content,
    };

    let message: Message = diesel::insert_into(messages::table)
        .values(&new_message)
        .get_result(&mut conn)?;

    let payload = serde_json::to_value(&message)
        .map_err(|e| AppError::internal(e.to_string()))?;
    state.notifier.notify_new_message(message.receiver_id, &payload);

    Ok(Json(ApiResponse::ok(message)))
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub messages: Vec<Message>,
}

/// GET /message/conversation/:other_user_id - every message between the
/// unordered pair, oldest first. Pure read; the same set from either side.
pub async fn get_conversation(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(other_user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ConversationResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let other_exists: bool = users::table
        .find(other_user_id)
        .count()
        .get_result::<i64>(&mut conn)
        .map(|c| c > 0)
        .unwrap_or(false);
    if !other_exists {
        return Err(AppError::new(ErrorCode::UserNotFound, "user not found"));
    }

    let rows: Vec<Message> = messages::table
        .filter(
            messages::sender_id
                .eq(user.id)
                .and(messages::receiver_id.eq(other_user_id))
                .or(messages::sender_id
                    .eq(other_user_id)
                    .and(messages::receiver_id.eq(user.id))),
        )
        .order(messages::created_at.asc())
        .load(&mut conn)?;

    Ok(Json(ApiResponse::ok(ConversationResponse { messages: rows })))
}
