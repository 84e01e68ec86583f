//! Gesture recognition extension point.
//!
//! The analytics "recognized" count asks a classifier what it thinks each
//! gesture is and compares that with what the student submitted. The default
//! classifier trusts the submission; a trained model plugs in here.

use crate::types::{Gesture, GestureType};
use serde::{Deserialize, Serialize};

/// What a classifier thinks a gesture is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: GestureType,
    /// Confidence in `label`, 0.0..=1.0.
    pub confidence: f32,
}

/// Trait that all gesture classifiers must implement.
pub trait GestureClassifier: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Classify a stored gesture.
    fn classify(&self, gesture: &Gesture) -> Classification;
}

/// Accepts every submitted gesture as-is with full confidence.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustingClassifier;

impl GestureClassifier for TrustingClassifier {
    fn name(&self) -> &str {
        "trusting"
    }

    fn classify(&self, gesture: &Gesture) -> Classification {
        Classification {
            label: gesture.gesture_type,
            confidence: 1.0,
        }
    }
}

/// A gesture counts as recognized when the classifier agrees with the
/// submitted type at or above `min_confidence`.
pub fn is_recognized(classification: &Classification, gesture: &Gesture, min_confidence: f32) -> bool {
    classification.label == gesture.gesture_type && classification.confidence >= min_confidence
}

/// Number of `gestures` the classifier recognizes.
pub fn count_recognized(
    classifier: &dyn GestureClassifier,
    gestures: &[Gesture],
    min_confidence: f32,
) -> usize {
    gestures
        .iter()
        .filter(|g| is_recognized(&classifier.classify(g), g, min_confidence))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn gesture(kind: GestureType) -> Gesture {
        Gesture {
            id: uuid::Uuid::new_v4().to_string(),
            student_name: "Sam".into(),
            gesture_type: kind,
            message: kind.default_message().into(),
            timestamp: Utc::now(),
        }
    }

    /// Always answers "wave" with a fixed confidence.
    struct AlwaysWave(f32);

    impl GestureClassifier for AlwaysWave {
        fn name(&self) -> &str {
            "always-wave"
        }

        fn classify(&self, _gesture: &Gesture) -> Classification {
            Classification {
                label: GestureType::Wave,
                confidence: self.0,
            }
        }
    }

    #[test]
    fn test_trusting_recognizes_everything() {
        let gestures: Vec<_> = GestureType::ALL.iter().map(|&k| gesture(k)).collect();
        assert_eq!(count_recognized(&TrustingClassifier, &gestures, 0.5), 3);
        assert_eq!(count_recognized(&TrustingClassifier, &gestures, 1.0), 3);
    }

    #[test]
    fn test_disagreeing_label_not_recognized() {
        let gestures = vec![gesture(GestureType::Wave), gesture(GestureType::Tilt)];
        assert_eq!(count_recognized(&AlwaysWave(0.9), &gestures, 0.5), 1);
    }

    #[test]
    fn test_low_confidence_not_recognized() {
        let gestures = vec![gesture(GestureType::Wave)];
        assert_eq!(count_recognized(&AlwaysWave(0.4), &gestures, 0.5), 0);
        assert_eq!(count_recognized(&AlwaysWave(0.5), &gestures, 0.5), 1);
    }
}
