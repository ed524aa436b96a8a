use std::sync::Arc;

use dashmap::DashMap;
use socketioxide::SocketIo;
use uuid::Uuid;

/// Who currently holds a live socket: user id -> socket id.
///
/// Added on connect, removed on disconnect, never persisted. A reconnect
/// replaces the previous handle, so removal only applies when the departing
/// socket is still the registered one.
#[derive(Default)]
pub struct ConnectionRegistry {
    sessions: DashMap<Uuid, String>,
}

impl ConnectionRegistry {
    pub fn add(&self, user_id: Uuid, socket_id: String) {
        self.sessions.insert(user_id, socket_id);
    }

    pub fn remove(&self, user_id: Uuid, socket_id: &str) {
        self.sessions.remove_if(&user_id, |_, current| current == socket_id);
    }

    pub fn is_connected(&self, user_id: Uuid) -> bool {
        self.sessions.contains_key(&user_id)
    }

    pub fn connected_count(&self) -> usize {
        self.sessions.len()
    }
}

/// Fire-and-forget push channel to connected clients. At most once, no
/// acknowledgment, no replay: an offline receiver's event is dropped.
#[derive(Clone)]
pub struct Notifier {
    io: SocketIo,
    registry: Arc<ConnectionRegistry>,
}

impl Notifier {
    pub fn new(io: SocketIo, registry: Arc<ConnectionRegistry>) -> Self {
        Self { io, registry }
    }

    /// `new_match` goes to both participants' live sessions.
    pub fn notify_new_match(&self, user_a: Uuid, user_b: Uuid, payload: &serde_json::Value) {
        self.push(user_a, "new_match", payload);
        self.push(user_b, "new_match", payload);
    }

    /// `new_message` goes to the receiver only; the sender already has it.
    pub fn notify_new_message(&self, receiver_id: Uuid, payload: &serde_json::Value) {
        self.push(receiver_id, "new_message", payload);
    }

    fn push(&self, user_id: Uuid, event: &'static str, payload: &serde_json::Value) {
        if !self.registry.is_connected(user_id) {
            tracing::debug!(user_id = %user_id, event = event, "receiver offline, push dropped");
            return;
        }
        let room = format!("user:{user_id}");
        if let Err(e) = self.io.to(room).emit(event, payload) {
            tracing::warn!(error = %e, user_id = %user_id, event = event, "socket emit failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_tracks_connections() {
        let registry = ConnectionRegistry::default();
        let user = Uuid::new_v4();

        assert!(!registry.is_connected(user));
        registry.add(user, "sid-1".into());
        assert!(registry.is_connected(user));
        assert_eq!(registry.connected_count(), 1);

        registry.remove(user, "sid-1");
        assert!(!registry.is_connected(user));
    }

    #[test]
    fn stale_disconnect_does_not_evict_reconnect() {
        let registry = ConnectionRegistry::default();
        let user = Uuid::new_v4();

        registry.add(user, "sid-old".into());
        registry.add(user, "sid-new".into());

        // The old socket's disconnect fires after the reconnect.
        registry.remove(user, "sid-old");
        assert!(registry.is_connected(user));

        registry.remove(user, "sid-new");
        assert!(!registry.is_connected(user));
    }
}
