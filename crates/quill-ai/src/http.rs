//! HTTP plumbing shared by the transport adapters.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::{BackendError, BackendErrorKind};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client whose reads fail once the connection has been idle for `timeout`.
///
/// This bounds stalls without capping how long a live stream may run;
/// non-streaming calls add a whole-request deadline per request.
pub(crate) fn build_client(provider: &str, timeout: Duration) -> Result<reqwest::Client, BackendError> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .read_timeout(timeout)
        .build()
        .map_err(|e| BackendError::from_reqwest(provider, e))
}

/// Join an endpoint root and a path without doubling the slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Pass successful responses through; turn anything else into a
/// `BackendError` carrying the status and whatever detail the body offers.
pub(crate) async fn ensure_success(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_detail(&body).unwrap_or_default();
    let kind = if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        BackendErrorKind::RateLimited
    } else {
        BackendErrorKind::Status
    };

    Err(BackendError::new(provider, kind, message).with_status(status.as_u16()))
}

/// Read and deserialize a success body, classifying shape mismatches as `Parse`.
pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: &str,
    response: reqwest::Response,
) -> Result<T, BackendError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| BackendError::from_reqwest(provider, e))?;
    serde_json::from_slice(&bytes).map_err(|e| {
        BackendError::new(
            provider,
            BackendErrorKind::Parse,
            format!("unexpected response shape: {e}"),
        )
    })
}

/// Pull a human-readable message out of an error body.
///
/// Both backends use `{"error": {"message": ...}}`; some gateways send a
/// bare `{"error": "..."}` or `{"message": ...}`. Returns `None` when the
/// body is not JSON or carries none of these.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body.trim()).ok()?;

    let text = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .or_else(|| value.get("error").and_then(|v| v.as_str()))
        .or_else(|| value.get("message").and_then(|v| v.as_str()))?;

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}
