use thiserror::Error;

/// Failure of one structured completion call.
///
/// `Transport`, `Status` and `Timeout` mean the call did not come back with a
/// usable HTTP response; `Malformed` means it did, but carried no parseable
/// answer.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },
    #[error("request timed out")]
    Timeout,
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl LlmError {
    pub fn is_transport(&self) -> bool {
        !matches!(self, LlmError::Malformed(_))
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_decode() {
            LlmError::Malformed(err.to_string())
        } else {
            LlmError::Transport(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_is_not_a_transport_failure() {
        assert!(!LlmError::Malformed("x".into()).is_transport());
        assert!(LlmError::Timeout.is_transport());
        assert!(LlmError::Status {
            status: 503,
            message: "unavailable".into()
        }
        .is_transport());
    }
}
