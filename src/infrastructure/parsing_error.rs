//! Error types for fetching and parsing listing pages
//!
//! Errors carry enough context (URL, selector, status) to be logged on
//! their own, and say whether a retry is worth attempting.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("HTTP request failed: {status} - {message} ({url})")]
    HttpRequestFailed {
        status: u16,
        message: String,
        url: String,
    },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Rate limit exceeded: {retry_after_seconds}s ({url})")]
    RateLimitExceeded {
        retry_after_seconds: u64,
        url: String,
    },

    #[error("Invalid URL {url}: {reason}")]
    UrlResolutionFailed { url: String, reason: String },
}

impl ParsingError {
    pub fn invalid_selector(selector: &str, reason: impl ToString) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn network(url: &str, error: impl ToString) -> Self {
        Self::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }

    /// Check if a retry could succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidSelector { .. } => false,
            Self::HttpRequestFailed { status, .. } => *status >= 500 || *status == 408,
            Self::Network { .. } => true,
            Self::RateLimitExceeded { .. } => true,
            Self::UrlResolutionFailed { .. } => false,
        }
    }

    /// Server-requested delay before retrying, when known
    pub fn retry_delay_seconds(&self) -> Option<u64> {
        match self {
            Self::RateLimitExceeded {
                retry_after_seconds,
                ..
            } => Some(*retry_after_seconds),
            Self::HttpRequestFailed { status, .. } if *status >= 500 => Some(5),
            _ => None,
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_and_rate_limits_are_recoverable() {
        let server = ParsingError::HttpRequestFailed {
            status: 503,
            message: "Service Unavailable".into(),
            url: "https://a.sg".into(),
        };
        let missing = ParsingError::HttpRequestFailed {
            status: 404,
            message: "Not Found".into(),
            url: "https://a.sg".into(),
        };
        let limited = ParsingError::RateLimitExceeded {
            retry_after_seconds: 7,
            url: "https://a.sg".into(),
        };

        assert!(server.is_recoverable());
        assert_eq!(server.retry_delay_seconds(), Some(5));
        assert!(!missing.is_recoverable());
        assert_eq!(missing.retry_delay_seconds(), None);
        assert!(limited.is_recoverable());
        assert_eq!(limited.retry_delay_seconds(), Some(7));
        assert!(!ParsingError::invalid_selector("..", "bad").is_recoverable());
    }

    #[test]
    fn messages_name_the_url() {
        let err = ParsingError::network("https://shengsiong.com.sg/fruits", "timed out");
        assert_eq!(err.to_string(), "Network error for https://shengsiong.com.sg/fruits: timed out");
    }
}
