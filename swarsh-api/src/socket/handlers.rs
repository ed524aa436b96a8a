use std::sync::Arc;

use diesel::prelude::*;
use serde::Serialize;
use socketioxide::extract::{Data, SocketRef};
use uuid::Uuid;

use crate::schema::users;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

fn get_user_id(socket: &SocketRef) -> Option<Uuid> {
    socket.extensions.get::<Uuid>()
}

pub async fn on_connect_with_state(socket: SocketRef, state: Arc<AppState>) {
    let user_id = match authenticate_socket(&socket, &state) {
        Ok(id) => id,
        Err(msg) => {
            tracing::warn!(error = %msg, "socket auth failed");
            let _ = socket.emit(
                "error",
                &ErrorPayload {
                    code: "AUTH_FAILED".into(),
                    message: msg,
                },
            );
            socket.disconnect().ok();
            return;
        }
    };

    // Store user_id in socket extensions
    socket.extensions.insert(user_id);

    // Join the user-specific room so pushes can target this user
    let user_room = format!("user:{user_id}");
    socket.join(user_room).ok();

    state.registry.add(user_id, socket.id.to_string());

    tracing::info!(
        user_id = %user_id,
        sid = %socket.id,
        online = state.registry.connected_count(),
        "socket connected"
    );

    // Presence bookkeeping (fire-and-forget)
    let state_presence = state.clone();
    tokio::spawn(async move {
        set_presence(&state_presence, user_id, true).await;
    });

    let _ = socket.emit("connected", &serde_json::json!({ "user_id": user_id }));

    // typing / stop_typing are ephemeral: relayed to the receiver, never stored
    socket.on("typing", |socket: SocketRef, Data::<serde_json::Value>(payload)| async move {
        on_typing(socket, payload, true);
    });

    socket.on("stop_typing", |socket: SocketRef, Data::<serde_json::Value>(payload)| async move {
        on_typing(socket, payload, false);
    });

    // Heartbeat handler - refresh presence TTL
    socket.on("heartbeat", {
        let state = state.clone();
        move |socket: SocketRef| {
            let state = state.clone();
            async move {
                if let Some(user_id) = get_user_id(&socket) {
                    let _ = state.redis.set(&format!("online:{user_id}"), "1", 120).await;
                }
            }
        }
    });

    socket.on_disconnect({
        let state = state.clone();
        move |socket: SocketRef| {
            let state = state.clone();
            async move {
                on_disconnect_with_state(socket, state).await;
            }
        }
    });
}

fn on_typing(socket: SocketRef, payload: serde_json::Value, typing: bool) {
    let user_id = match get_user_id(&socket) {
        Some(id) => id,
        None => return,
    };

    let receiver_id = match payload
        .get("receiver_id")
        .and_then(|v| v.as_str())
        .and_then(|s| Uuid::parse_str(s).ok())
    {
        Some(id) => id,
        None => {
            tracing::warn!("typing event missing 'receiver_id' field");
            return;
        }
    };

    let receiver_room = format!("user:{receiver_id}");
    let _ = socket.to(receiver_room).emit(
        "user_typing",
        &serde_json::json!({ "user_id": user_id, "typing": typing }),
    );
}

async fn on_disconnect_with_state(socket: SocketRef, state: Arc<AppState>) {
    let user_id = match get_user_id(&socket) {
        Some(id) => id,
        None => return,
    };

    tracing::info!(user_id = %user_id, sid = %socket.id, "socket disconnected");

    state.registry.remove(user_id, &socket.id.to_string());

    // A fresh connection may already have replaced this one
    if !state.registry.is_connected(user_id) {
        set_presence(&state, user_id, false).await;
    }
}

/// Update the Redis presence key and the users row together.
async fn set_presence(state: &Arc<AppState>, user_id: Uuid, is_online: bool) {
    let key = format!("online:{user_id}");
    let result = if is_online {
        state.redis.set(&key, "1", 120).await
    } else {
        state.redis.del(&key).await
    };
    if let Err(e) = result {
        tracing::warn!(error = %e, user_id = %user_id, "failed to update presence key");
    }

    let mut conn = match state.db.get() {
        Ok(conn) => conn,
        Err(e) => {
            tracing::warn!(error = %e, "no database connection for presence update");
            return;
        }
    };

    if let Err(e) = diesel::update(users::table.find(user_id))
        .set((
            users::is_online.eq(is_online),
            users::last_seen_at.eq(Some(chrono::Utc::now())),
        ))
        .execute(&mut conn)
    {
        tracing::warn!(error = %e, user_id = %user_id, "failed to update presence in database");
    }
}

fn authenticate_socket(socket: &SocketRef, state: &Arc<AppState>) -> Result<Uuid, String> {
    let connect_info = socket.req_parts();

    // Extract token from query string ?token=xxx
    let query = connect_info.uri.query().unwrap_or_default();
    let token = query
        .split('&')
        .find_map(|pair| {
            let mut split = pair.splitn(2, '=');
            let key = split.next()?;
            let value = split.next()?;
            if key == "token" {
                Some(value.to_string())
            } else {
                None
            }
        })
        .ok_or_else(|| "missing token query parameter".to_string())?;

    // Validate JWT
    let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = jsonwebtoken::decode::<swarsh_shared::types::auth::Claims>(
        &token,
        &jsonwebtoken::DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| format!("invalid token: {e}"))?;

    if token_data.claims.is_expired() {
        return Err("token has expired".into());
    }

    Ok(token_data.claims.sub)
}
