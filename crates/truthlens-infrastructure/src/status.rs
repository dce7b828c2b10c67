//! Mapping of HTTP failures to user-facing messages.

use serde_json::Value;

use truthlens_core::TruthlensError;

/// User-facing message for a non-2xx status from the first-party API.
pub fn status_message(status: u16) -> &'static str {
    match status {
        400 => "Invalid request. Please check your input and try again.",
        401 => "You need to be logged in to perform this action.",
        403 => "You don't have permission to access this resource.",
        404 => "The requested resource was not found.",
        408 => "Request timeout. Please try again.",
        409 => "Article has already been analyzed",
        422 => "The data provided is invalid or incomplete.",
        429 => "Too many requests. Please slow down and try again later.",
        500 => "Server error. Our team has been notified.",
        502 => "Unable to connect to the server. Please try again.",
        503 => "Service temporarily unavailable. Please try again in a moment.",
        504 => "Request timeout. The server took too long to respond.",
        _ => "Something went wrong",
    }
}

/// Extracts a human message from an error response body, preferring the
/// server's own wording over the generic status table.
///
/// The backend is not consistent about the field name, so the usual
/// candidates are tried in order.
pub fn message_from_body(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error", "detail", "msg"] {
            if let Some(text) = value.get(key).and_then(Value::as_str)
                && !text.is_empty()
            {
                return text.to_string();
            }
        }
    }
    status_message(status).to_string()
}

/// Builds the `Api` error for a failed first-party response.
pub fn api_error(status: u16, body: &str) -> TruthlensError {
    TruthlensError::api(status, message_from_body(status, body))
}

/// Maps a transport failure into a `Network` error with connection-level
/// phrasing.
pub fn network_error(err: &reqwest::Error) -> TruthlensError {
    if err.is_timeout() {
        TruthlensError::network("Request timeout. Please try again.")
    } else if err.is_connect() {
        TruthlensError::network(
            "Unable to connect to the server. Please check your internet connection.",
        )
    } else {
        TruthlensError::network(format!("Network error: {err}"))
    }
}
