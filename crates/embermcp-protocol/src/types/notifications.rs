//! Core notification payloads: cancellation and progress.

use serde::{Deserialize, Serialize};

use crate::jsonrpc::RequestId;

use super::core::ProgressToken;

/// `notifications/cancelled` parameters.
///
/// `request_id` references a request originated by the *sender's peer*,
/// i.e. a request the receiver is currently handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelledParams {
    /// Identifier of the request being cancelled
    #[serde(rename = "requestId")]
    pub request_id: RequestId,
    /// Human-readable reason for the cancellation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `notifications/progress` parameters.
///
/// `progress` is expected to increase monotonically, but regressions are
/// tolerated on receipt; `total` may be unknown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressParams {
    /// Token from the original request's `_meta.progressToken`
    #[serde(rename = "progressToken")]
    pub progress_token: ProgressToken,
    /// Amount of work done so far
    pub progress: f64,
    /// Total amount of work, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    /// Human-readable status message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_params_wire_names() {
        let params = CancelledParams {
            request_id: RequestId::Number(9),
            reason: Some("user abort".to_string()),
        };
        let wire = serde_json::to_value(&params).unwrap();
        assert_eq!(wire["requestId"], 9);
        assert_eq!(wire["reason"], "user abort");
    }

    #[test]
    fn test_progress_params_optionals_elided() {
        let params = ProgressParams {
            progress_token: ProgressToken::Number(1),
            progress: 0.5,
            total: None,
            message: None,
        };
        let wire = serde_json::to_value(&params).unwrap();
        assert_eq!(wire["progressToken"], 1);
        assert!(wire.get("total").is_none());
        assert!(wire.get("message").is_none());
    }
}
