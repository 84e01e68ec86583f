use crate::error::FieldError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The closed set of gestures a student can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureType {
    Wave,
    Shake,
    Tilt,
}

impl GestureType {
    pub const ALL: [GestureType; 3] = [GestureType::Wave, GestureType::Shake, GestureType::Tilt];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wave => "wave",
            Self::Shake => "shake",
            Self::Tilt => "tilt",
        }
    }

    /// The classroom message a submitting page attaches to this gesture.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::Wave => "Needs Help",
            Self::Shake => "Ready to Answer",
            Self::Tilt => "Wants Break",
        }
    }
}

impl fmt::Display for GestureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GestureType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| format!("unknown gesture type: {s}"))
    }
}

/// A stored gesture event. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gesture {
    pub id: String,
    pub student_name: String,
    pub gesture_type: GestureType,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Validated input for creating a gesture. Id and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGesture {
    pub student_name: String,
    pub gesture_type: GestureType,
    pub message: String,
}

impl NewGesture {
    pub fn new(
        student_name: impl Into<String>,
        gesture_type: GestureType,
        message: impl Into<String>,
    ) -> Self {
        Self {
            student_name: student_name.into(),
            gesture_type,
            message: message.into(),
        }
    }
}

/// Raw submission body as received over HTTP.
///
/// Every field is kept as an untyped JSON value so that a wrong type on one
/// field is reported alongside the others instead of failing the whole body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureSubmission {
    #[serde(default)]
    pub student_name: Option<Value>,
    #[serde(default)]
    pub gesture_type: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
}

impl GestureSubmission {
    /// Check every field and collect all problems at once.
    pub fn validate(&self) -> Result<NewGesture, Vec<FieldError>> {
        let mut errors = Vec::new();

        let student_name = required_text("studentName", self.student_name.as_ref(), &mut errors);
        let gesture_type = required_text("gestureType", self.gesture_type.as_ref(), &mut errors)
            .and_then(|raw| match raw.parse::<GestureType>() {
                Ok(g) => Some(g),
                Err(_) => {
                    errors.push(FieldError::new(
                        "gestureType",
                        format!("must be one of {}", allowed_gestures()),
                    ));
                    None
                }
            });
        let message = required_text("message", self.message.as_ref(), &mut errors);

        match (student_name, gesture_type, message) {
            (Some(student_name), Some(gesture_type), Some(message)) if errors.is_empty() => {
                Ok(NewGesture {
                    student_name,
                    gesture_type,
                    message,
                })
            }
            _ => Err(errors),
        }
    }
}

fn required_text(field: &str, value: Option<&Value>, errors: &mut Vec<FieldError>) -> Option<String> {
    match value {
        None | Some(Value::Null) => {
            errors.push(FieldError::new(field, "is required"));
            None
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            errors.push(FieldError::new(field, "must not be empty"));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(FieldError::new(field, "must be a string"));
            None
        }
    }
}

fn allowed_gestures() -> String {
    GestureType::ALL
        .iter()
        .map(|g| g.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Message pushed to dashboards over the real-time channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum RealtimeMessage {
    Gesture(Gesture),
}
