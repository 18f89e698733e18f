use thiserror::Error;

/// Uniform failure returned by every backend gateway call.
///
/// Transport detail (status codes, headers, decoder internals) is folded
/// into the message so the state managers only ever see success or a
/// human-readable failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Connection refused, DNS failure, timeout.
    #[error("network failure: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The backend answered, but the payload could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl GatewayError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        GatewayError::Rejected {
            status,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Network(format!("request timed out: {}", err))
        } else if err.is_decode() {
            GatewayError::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            GatewayError::rejected(status.as_u16(), err.to_string())
        } else {
            GatewayError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Malformed(err.to_string())
    }
}
