use crate::graph::{EdgeId, NodeId};
use crate::session::SessionState;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid layout configuration: {message}")]
    Config { message: String },

    #[error("layout service responded with status {status}: {body}")]
    Transport { status: u16, body: String },

    #[error("layout service request failed: {message}")]
    Network { message: String },

    #[error("layout service request timed out (aborted after {after_ms}ms)")]
    Timeout { after_ms: u64 },

    #[error("unrecognized layout response: {message}")]
    ResponseShape { message: String },

    #[error("graph contains an edge with a missing endpoint: {edge}")]
    MissingEndpoint { edge: EdgeId },

    #[error("graph contains a duplicate node id: {node}")]
    DuplicateNode { node: NodeId },

    #[error("cannot {action} a layout session in state {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: SessionState,
    },
}

/// Coarse error classification, used by callers that only need to branch on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    Transport,
    Timeout,
    ResponseShape,
    Graph,
    Lifecycle,
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn response_shape(message: impl Into<String>) -> Self {
        Self::ResponseShape {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } => ErrorKind::Config,
            Self::Transport { .. } | Self::Network { .. } => ErrorKind::Transport,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::ResponseShape { .. } => ErrorKind::ResponseShape,
            Self::MissingEndpoint { .. } | Self::DuplicateNode { .. } => ErrorKind::Graph,
            Self::InvalidTransition { .. } => ErrorKind::Lifecycle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_classified_apart_from_transport_failures() {
        let timeout = Error::Timeout { after_ms: 100 };
        let network = Error::Network {
            message: "connection reset".to_string(),
        };
        assert_eq!(timeout.kind(), ErrorKind::Timeout);
        assert_eq!(network.kind(), ErrorKind::Transport);
        assert!(timeout.to_string().contains("timed out"));
    }
}
