//! Progress plumbing: callbacks, token attachment, token extraction.
//!
//! When a caller wants progress for a request, the session allocates a
//! token and injects it under `_meta.progressToken` in the outbound
//! parameters. The peer echoes the token in `notifications/progress`
//! frames, which the dispatcher routes back to the registered callback.

use std::sync::Arc;

use serde_json::{Map, Value};
use embermcp_protocol::types::ProgressToken;
use embermcp_protocol::{Error, Result};

/// A progress event delivered to a request's progress callback.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    /// Amount of work done so far
    pub progress: f64,
    /// Total amount of work, when the peer knows it
    pub total: Option<f64>,
    /// Human-readable status message
    pub message: Option<String>,
}

/// Callback invoked for each progress notification matching a request.
///
/// Invoked on the session's reader task without any locks held; keep it
/// cheap and non-blocking.
pub type ProgressCallback = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Inject `_meta.progressToken` into outbound request parameters,
/// creating the params object and `_meta` map as needed.
pub(crate) fn attach_progress_token(
    params: &mut Option<Value>,
    token: &ProgressToken,
) -> Result<()> {
    let params = params.get_or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(map) = params else {
        return Err(Error::InvalidParams(
            "request params must be an object to carry progress metadata".to_string(),
        ));
    };
    let meta = map
        .entry("_meta")
        .or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(meta) = meta else {
        return Err(Error::InvalidParams(
            "_meta must be an object".to_string(),
        ));
    };
    meta.insert("progressToken".to_string(), serde_json::to_value(token)?);
    Ok(())
}

/// Read `_meta.progressToken` from inbound request parameters, if present.
pub(crate) fn extract_progress_token(params: Option<&Value>) -> Option<ProgressToken> {
    let token = params?.get("_meta")?.get("progressToken")?;
    serde_json::from_value(token.clone()).ok()
}
