//! Connected clients and outbound fan-out
//!
//! Delivery never waits on a slow client. Each connection owns a bounded
//! queue drained by its socket writer; a full queue drops the message and a
//! closed queue removes the connection.

use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::game::simulation::{Audience, Outbound};
use crate::game::PlayerId;
use crate::ws::protocol::ServerMsg;

/// Serialized message text, shared between all recipients
pub type Frame = Arc<str>;

/// Per-connection outbound queue depth
pub const OUTBOUND_QUEUE: usize = 64;

#[derive(Default)]
pub struct ConnectionRegistry {
    clients: DashMap<PlayerId, mpsc::Sender<Frame>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and get the receiving end of its outbound queue.
    /// Returns `None` if the id is already taken.
    pub fn register(&self, id: PlayerId) -> Option<mpsc::Receiver<Frame>> {
        match self.clients.entry(id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE);
                slot.insert(tx);
                Some(rx)
            }
        }
    }

    pub fn unregister(&self, id: &PlayerId) -> bool {
        self.clients.remove(id).is_some()
    }

    pub fn connection_count(&self) -> usize {
        self.clients.len()
    }

    pub fn send_to(&self, id: &PlayerId, msg: &ServerMsg) {
        if let Some(frame) = encode(msg) {
            self.send_frame(id, frame);
        }
    }

    pub fn broadcast(&self, msg: &ServerMsg) {
        if let Some(frame) = encode(msg) {
            self.fan_out(frame, None);
        }
    }

    pub fn broadcast_except(&self, skip: &PlayerId, msg: &ServerMsg) {
        if let Some(frame) = encode(msg) {
            self.fan_out(frame, Some(skip));
        }
    }

    /// Route a simulation event to its audience
    pub fn deliver(&self, outbound: Outbound) {
        let msg = ServerMsg::from(outbound.event);
        match &outbound.audience {
            Audience::Only(id) => self.send_to(id, &msg),
            Audience::AllExcept(id) => self.broadcast_except(id, &msg),
        }
    }

    fn send_frame(&self, id: &PlayerId, frame: Frame) {
        let closed = match self.clients.get(id) {
            Some(tx) => !try_deliver(id, &tx, frame),
            None => {
                debug!(player_id = %id, "No connection for unicast");
                false
            }
        };
        if closed {
            self.clients.remove(id);
        }
    }

    fn fan_out(&self, frame: Frame, skip: Option<&PlayerId>) {
        let mut closed = Vec::new();
        for entry in self.clients.iter() {
            if Some(entry.key()) == skip {
                continue;
            }
            if !try_deliver(entry.key(), entry.value(), Arc::clone(&frame)) {
                closed.push(entry.key().clone());
            }
        }
        // Removal must wait until the iterator's shard locks are released
        for id in closed {
            self.clients.remove(&id);
        }
    }
}

fn encode(msg: &ServerMsg) -> Option<Frame> {
    match serde_json::to_string(msg) {
        Ok(json) => Some(json.into()),
        Err(e) => {
            warn!(error = %e, "Failed to serialize outbound message");
            None
        }
    }
}

/// Returns false once the connection's queue is closed.
fn try_deliver(id: &PlayerId, tx: &mpsc::Sender<Frame>, frame: Frame) -> bool {
    match tx.try_send(frame) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            warn!(player_id = %id, "Outbound queue full, dropping message");
            true
        }
        Err(TrySendError::Closed(_)) => {
            debug!(player_id = %id, "Outbound queue closed");
            false
        }
    }
}
