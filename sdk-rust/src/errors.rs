use thiserror::Error;

#[derive(Error, Debug)]
pub enum LanguageModelError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The request to the provider failed or the parsing of the response
    /// failed.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The request returns a non-OK status code
    #[error("Status error: {1} (Status {0})")]
    StatusCode(reqwest::StatusCode, String),
    /// The response from the provider was unexpected. (e.g. no candidates
    /// returned by Gemini)
    #[error("Invariant from {0}: {1}")]
    Invariant(&'static str, String),
    /// The model refused to process the input. (e.g. a prompt blocked by
    /// safety filters)
    #[error("Refusal: {0}")]
    Refusal(String),
}

/// Whether repeating the same request can be expected to succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Timeouts, dropped connections, rate limits and upstream 5xx.
    Retryable,
    /// Authentication or configuration problems, rejected input, malformed
    /// responses and refusals.
    Terminal,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Retryable => "retryable",
            Self::Terminal => "terminal",
        }
    }
}

impl LanguageModelError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(error) => {
                if error.is_timeout() || error.is_connect() || error.is_request() {
                    ErrorKind::Retryable
                } else if let Some(status) = error.status() {
                    status_kind(status)
                } else {
                    ErrorKind::Terminal
                }
            }
            Self::StatusCode(status, _) => status_kind(*status),
            Self::InvalidInput(_) | Self::Invariant(_, _) | Self::Refusal(_) => ErrorKind::Terminal,
        }
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Retryable
    }
}

fn status_kind(status: reqwest::StatusCode) -> ErrorKind {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
    {
        ErrorKind::Retryable
    } else {
        ErrorKind::Terminal
    }
}

pub type LanguageModelResult<T> = Result<T, LanguageModelError>;

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn classifies_status_codes() {
        let cases = [
            (StatusCode::TOO_MANY_REQUESTS, ErrorKind::Retryable),
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorKind::Retryable),
            (StatusCode::SERVICE_UNAVAILABLE, ErrorKind::Retryable),
            (StatusCode::REQUEST_TIMEOUT, ErrorKind::Retryable),
            (StatusCode::BAD_REQUEST, ErrorKind::Terminal),
            (StatusCode::UNAUTHORIZED, ErrorKind::Terminal),
            (StatusCode::FORBIDDEN, ErrorKind::Terminal),
            (StatusCode::NOT_FOUND, ErrorKind::Terminal),
        ];

        for (status, expected) in cases {
            let error = LanguageModelError::StatusCode(status, String::new());
            assert_eq!(error.kind(), expected, "status {status}");
        }
    }

    #[test]
    fn non_transport_errors_are_terminal() {
        assert!(!LanguageModelError::InvalidInput("empty".into()).is_retryable());
        assert!(!LanguageModelError::Invariant("google", "no candidate".into()).is_retryable());
        assert!(!LanguageModelError::Refusal("SAFETY".into()).is_retryable());
    }
}
