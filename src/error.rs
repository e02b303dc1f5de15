//! Router error types.

use thiserror::Error;

use crate::dispatch::UpstreamError;

/// Errors surfaced by the routing core.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The pool was constructed without any backend address.
    #[error("Cannot start a router with an empty Application API address list")]
    EmptyPool,

    /// The outbound call failed in a way other than a plain connection failure.
    #[error("upstream {address} failed: {source}")]
    Upstream {
        address: String,
        #[source]
        source: UpstreamError,
    },
}

impl RouterError {
    /// True when the underlying fault was the outbound request timing out.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            RouterError::Upstream {
                source: UpstreamError::Timeout(_),
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_display() {
        assert_eq!(
            RouterError::EmptyPool.to_string(),
            "Cannot start a router with an empty Application API address list"
        );

        let err = RouterError::Upstream {
            address: "http://api1.example.com".into(),
            source: UpstreamError::Transport("incomplete message".into()),
        };
        assert_eq!(
            err.to_string(),
            "upstream http://api1.example.com failed: transport error: incomplete message"
        );
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_is_timeout() {
        let err = RouterError::Upstream {
            address: "http://api1.example.com".into(),
            source: UpstreamError::Timeout(Duration::from_secs(30)),
        };
        assert!(err.is_timeout());
    }
}
