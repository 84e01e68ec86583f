//! Core of gestura: gesture events, the in-memory store, real-time fan-out,
//! and configuration.

pub mod broadcaster;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod error;
pub mod hub;
pub mod motion;
pub mod store;
pub mod types;

pub use broadcaster::{Broadcaster, Connection, ConnectionId, Frame};
pub use classifier::{Classification, GestureClassifier, TrustingClassifier};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use error::{FieldError, GesturaError};
pub use hub::GestureHub;
pub use store::GestureStore;
pub use types::{Gesture, GestureSubmission, GestureType, NewGesture, RealtimeMessage};
