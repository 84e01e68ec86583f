//! Real-time fan-out of new gestures to connected dashboards.
//!
//! Each open dashboard connection registers here and gets a queue. New events
//! are encoded once and pushed onto every open queue. Delivery is best-effort:
//! no acknowledgement, no retry, and no replay for connections that register
//! after an event was sent. Queues are bounded; a connection that falls
//! behind misses frames instead of buffering them.

use crate::error::Result;
use crate::types::{Gesture, RealtimeMessage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Default number of frames queued per connection before new frames are dropped.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Identifier of a registered connection.
pub type ConnectionId = u64;

/// An encoded push message, shared by every receiving connection.
pub type Frame = Arc<str>;

/// The receiving side of a registered connection.
#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    pub receiver: mpsc::Receiver<Frame>,
}

impl Connection {
    /// Wait for the next frame. Returns `None` once the connection is unregistered.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.receiver.recv().await
    }

    /// Take a queued frame without waiting.
    pub fn try_recv(&mut self) -> Option<Frame> {
        self.receiver.try_recv().ok()
    }
}

/// Registry of open dashboard connections.
pub struct Broadcaster {
    connections: Mutex<HashMap<ConnectionId, mpsc::Sender<Frame>>>,
    next_id: AtomicU64,
    capacity: usize,
}

impl Broadcaster {
    /// Create a registry with the default per-connection queue capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a registry with a custom per-connection queue capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    /// Add a connection to the delivery set.
    pub fn register(&self) -> Connection {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.capacity);
        self.lock().insert(id, tx);
        tracing::debug!(connection = id, "Registered realtime connection");
        Connection { id, receiver: rx }
    }

    /// Remove a connection. Safe to call more than once; returns whether it was present.
    pub fn unregister(&self, id: ConnectionId) -> bool {
        let removed = self.lock().remove(&id).is_some();
        if removed {
            tracing::debug!(connection = id, "Unregistered realtime connection");
        }
        removed
    }

    /// Number of registered connections.
    pub fn connection_count(&self) -> usize {
        self.lock().len()
    }

    /// Encode a gesture as a `{"type":"gesture","data":...}` frame.
    pub fn encode(gesture: &Gesture) -> Result<Frame> {
        let text = serde_json::to_string(&RealtimeMessage::Gesture(gesture.clone()))?;
        Ok(Arc::from(text))
    }

    /// Push an already-encoded frame to every open connection.
    ///
    /// Connections whose receiving side is gone are skipped; they stay
    /// registered until their own close handler unregisters them. A connection
    /// whose queue is full misses this frame and stays registered.
    /// Returns the number of connections the frame was queued for.
    pub fn send(&self, frame: &Frame) -> usize {
        let connections = self.lock();
        let mut delivered = 0;
        for (id, tx) in connections.iter() {
            match tx.try_send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::debug!(connection = id, "Realtime queue full, dropping frame");
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(connection = id, "Skipping closed realtime connection");
                }
            }
        }
        delivered
    }

    /// Encode and push a gesture to every open connection.
    pub fn broadcast(&self, gesture: &Gesture) -> Result<usize> {
        let frame = Self::encode(gesture)?;
        Ok(self.send(&frame))
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ConnectionId, mpsc::Sender<Frame>>> {
        self.connections.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}
