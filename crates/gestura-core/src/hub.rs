//! Gesture submission: store, then push to dashboards.

use crate::broadcaster::Broadcaster;
use crate::classifier::{GestureClassifier, TrustingClassifier};
use crate::error::Result;
use crate::store::GestureStore;
use crate::types::{Gesture, NewGesture};
use std::sync::{Arc, Mutex, PoisonError};

/// Owns the event store, the connection registry, and the classifier.
///
/// Constructed once at startup and shared with the transport layer.
pub struct GestureHub {
    store: GestureStore,
    broadcaster: Broadcaster,
    classifier: Arc<dyn GestureClassifier>,
    /// Serializes append + push so every connection sees store-append order.
    submit_lock: Mutex<()>,
}

impl GestureHub {
    pub fn new(
        store: GestureStore,
        broadcaster: Broadcaster,
        classifier: Arc<dyn GestureClassifier>,
    ) -> Self {
        tracing::debug!(classifier = classifier.name(), "Gesture hub ready");
        Self {
            store,
            broadcaster,
            classifier,
            submit_lock: Mutex::new(()),
        }
    }

    /// Store a gesture and push it to every open dashboard connection.
    ///
    /// The push frame is encoded before the event is committed, so an encoding
    /// failure leaves the store untouched. Per-connection delivery problems
    /// never fail the submission.
    pub fn submit(&self, input: NewGesture) -> Result<Gesture> {
        let _guard = self.submit_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let (gesture, frame) = self.store.create_with(input, Broadcaster::encode)?;
        let delivered = self.broadcaster.send(&frame);

        tracing::info!(
            "Gesture received: {} - {} (pushed to {} connections)",
            gesture.student_name,
            gesture.message,
            delivered
        );
        Ok(gesture)
    }

    pub fn store(&self) -> &GestureStore {
        &self.store
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    pub fn classifier(&self) -> &dyn GestureClassifier {
        self.classifier.as_ref()
    }
}

impl Default for GestureHub {
    fn default() -> Self {
        Self::new(
            GestureStore::new(),
            Broadcaster::new(),
            Arc::new(TrustingClassifier),
        )
    }
}
