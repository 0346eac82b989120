use axum::extract::ws::Message;
use concierge_core::{ParticipantId, Role, SignalMessage};
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

struct PeerLink {
    connection: u64,
    role: Role,
    tx: mpsc::UnboundedSender<Message>,
}

#[derive(Default)]
struct RelayInner {
    peers: DashMap<ParticipantId, PeerLink>,
    next_connection: AtomicU64,
}

/// Реестр зарегистрированных участников. Пересылает кадры по полю `target`.
///
/// Dropping a participant's sender closes its socket.
#[derive(Clone, Default)]
pub struct RelayService {
    inner: Arc<RelayInner>,
}

impl RelayService {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn next_connection_id(&self) -> u64 {
        self.inner.next_connection.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Bind `user_id` to a connection. A re-register replaces (and closes) the older one.
    pub fn register(
        &self,
        connection: u64,
        user_id: ParticipantId,
        role: Role,
        tx: mpsc::UnboundedSender<Message>,
    ) {
        let link = PeerLink {
            connection,
            role,
            tx,
        };
        if let Some(old) = self.inner.peers.insert(user_id.clone(), link) {
            info!(
                "{} re-registered on #{}, closing older connection #{}",
                user_id, connection, old.connection
            );
        } else {
            info!("{} registered as {:?} on #{}", user_id, role, connection);
        }

        match role {
            Role::Customer => self.broadcast_to_owners(&SignalMessage::UserConnected { user_id }),
            Role::Owner => {
                let users = self.customers();
                self.send_to(&user_id, &SignalMessage::Users { users });
            }
        }
    }

    /// Connection closed. Ignored if `user_id` already belongs to a newer connection.
    pub fn unregister(&self, connection: u64, user_id: &ParticipantId) {
        let removed = self
            .inner
            .peers
            .remove_if(user_id, |_, link| link.connection == connection);

        match removed {
            Some((user_id, link)) => {
                info!("{} left (#{})", user_id, connection);
                self.announce_departure(user_id, link.role);
            }
            None => debug!("#{} for {} was already replaced", connection, user_id),
        }
    }

    /// Drop a participant on an owner's request. Returns false if unknown.
    pub fn disconnect(&self, user_id: &ParticipantId) -> bool {
        match self.inner.peers.remove(user_id) {
            Some((user_id, link)) => {
                info!("Disconnecting {} (#{}) on request", user_id, link.connection);
                self.announce_departure(user_id, link.role);
                true
            }
            None => false,
        }
    }

    /// Forward a frame untouched. Returns false if the target is not registered.
    pub fn forward(&self, target: &ParticipantId, frame: Message) -> bool {
        let Some(link) = self.inner.peers.get(target) else {
            return false;
        };
        if let Err(e) = link.tx.send(frame) {
            error!("Failed to forward frame to {}: {:?}", target, e);
        }
        true
    }

    pub fn is_registered(&self, user_id: &ParticipantId) -> bool {
        self.inner.peers.contains_key(user_id)
    }

    /// Registered customers, sorted.
    pub fn customers(&self) -> Vec<ParticipantId> {
        let mut users: Vec<ParticipantId> = self
            .inner
            .peers
            .iter()
            .filter(|entry| entry.role == Role::Customer)
            .map(|entry| entry.key().clone())
            .collect();
        users.sort();
        users
    }

    fn announce_departure(&self, user_id: ParticipantId, role: Role) {
        if role == Role::Customer {
            self.broadcast_to_owners(&SignalMessage::UserDisconnected { user_id });
        }
    }

    fn broadcast_to_owners(&self, msg: &SignalMessage) {
        let Some(frame) = encode(msg) else {
            return;
        };
        for entry in self.inner.peers.iter() {
            if entry.role == Role::Owner {
                let _ = entry.tx.send(frame.clone());
            }
        }
    }

    fn send_to(&self, user_id: &ParticipantId, msg: &SignalMessage) {
        let Some(frame) = encode(msg) else {
            return;
        };
        if !self.forward(user_id, frame) {
            warn!("Attempted to send '{}' to unknown {}", msg.kind(), user_id);
        }
    }
}

fn encode(msg: &SignalMessage) -> Option<Message> {
    match msg.to_json() {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            error!("Failed to serialize signal message: {}", e);
            None
        }
    }
}
