//! Placeholder motion heuristic standing in for a trained gesture model.

use crate::types::GestureType;
use serde::{Deserialize, Serialize};

/// Total absolute acceleration change (m/s²) a sample must exceed to count as a gesture.
pub const MOTION_THRESHOLD: f64 = 15.0;

/// Change in device acceleration relative to a resting baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionDelta {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MotionDelta {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Sum of absolute per-axis change.
    pub fn magnitude(&self) -> f64 {
        self.x.abs() + self.y.abs() + self.z.abs()
    }
}

/// Map a motion sample to a gesture.
///
/// Strong sideways motion is a shake, strong forward/back motion a tilt, and
/// anything else above the threshold a wave. Returns `None` below the threshold.
pub fn detect_gesture(delta: MotionDelta) -> Option<GestureType> {
    if delta.magnitude() <= MOTION_THRESHOLD {
        return None;
    }

    let (dx, dy, dz) = (delta.x.abs(), delta.y.abs(), delta.z.abs());
    if dx > dy && dx > dz {
        Some(GestureType::Shake)
    } else if dy > dx && dy > dz {
        Some(GestureType::Tilt)
    } else {
        Some(GestureType::Wave)
    }
}
