use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for word provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Failures of the remote word-generation service.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No remote provider is configured.
    #[error("word provider not configured")]
    NotConfigured,
    /// Required environment variable is missing.
    #[error("missing word provider environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed.
    #[error("failed to build word provider client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent.
    #[error("failed to send word request to `{url}`")]
    RequestSend {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The provider answered with a non-success status.
    #[error("word provider returned status {status}")]
    RequestStatus { status: StatusCode },
    /// The response body was not the expected JSON envelope.
    #[error("failed to decode word provider response")]
    DecodeResponse {
        #[source]
        source: reqwest::Error,
    },
    /// The completion carried no message content.
    #[error("word provider returned no content")]
    EmptyCompletion,
    /// The message content was not a JSON array of strings.
    #[error("word provider returned a malformed word list")]
    MalformedWordList {
        #[source]
        source: serde_json::Error,
    },
    /// The request timed out.
    #[error("word request timed out after {0:?}")]
    Timeout(Duration),
}

impl ProviderError {
    /// Whether another attempt can succeed without a configuration change.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::NotConfigured
            | ProviderError::MissingEnvVar { .. }
            | ProviderError::ClientBuilder { .. } => false,
            ProviderError::RequestStatus { status } => {
                status.is_server_error()
                    || *status == StatusCode::REQUEST_TIMEOUT
                    || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_failures_are_permanent() {
        assert!(!ProviderError::NotConfigured.is_retryable());
        assert!(!ProviderError::MissingEnvVar { var: "OPENAI_API_KEY" }.is_retryable());
        assert!(
            !ProviderError::RequestStatus {
                status: StatusCode::UNAUTHORIZED
            }
            .is_retryable()
        );
    }

    #[test]
    fn transient_failures_are_retried() {
        assert!(ProviderError::EmptyCompletion.is_retryable());
        assert!(ProviderError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(
            ProviderError::RequestStatus {
                status: StatusCode::TOO_MANY_REQUESTS
            }
            .is_retryable()
        );
        assert!(
            ProviderError::RequestStatus {
                status: StatusCode::BAD_GATEWAY
            }
            .is_retryable()
        );
    }
}
