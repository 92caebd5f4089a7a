//! Success and failure bodies shared by every REST route.

use serde::Serialize;
use utoipa::ToSchema;

/// Successful response carrying `data`.
#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T> {
    /// Always `true`.
    pub success: bool,
    /// Human readable outcome.
    pub message: String,
    /// Payload of the operation.
    pub data: T,
}

impl<T> Envelope<T> {
    /// Wrap `data` in a successful envelope.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Failed response. Never carries data.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    /// Always `false`.
    pub success: bool,
    /// Reason of the failure.
    pub message: String,
}

impl ErrorEnvelope {
    /// Build a failure body from `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Payload of operations that return nothing, serialized as `{}`.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct Empty {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn delete_envelope_carries_empty_object() {
        let body = serde_json::to_value(Envelope::ok("Team deleted successfully", Empty {})).unwrap();
        assert_eq!(
            body,
            json!({"success": true, "message": "Team deleted successfully", "data": {}})
        );
    }

    #[test]
    fn error_envelope_has_no_data() {
        let body = serde_json::to_value(ErrorEnvelope::new("Team not found")).unwrap();
        assert_eq!(body, json!({"success": false, "message": "Team not found"}));
    }
}
