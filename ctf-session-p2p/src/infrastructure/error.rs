use ctf_session_core::{IdentityError, WireError};

/// Why the connection gate turned a peer away
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("session is full ({max} active peer(s))")]
    AtCapacity { max: usize },

    #[error("malformed peer identifier: {0}")]
    InvalidIdentifier(IdentityError),

    #[error("protocol version mismatch (expected {expected}, got {actual})")]
    VersionMismatch { expected: u32, actual: u32 },

    #[error("connection request is stale ({skew_ms} ms from local clock)")]
    StaleRequest { skew_ms: i64 },
}

/// Session and transport errors
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid peer identifier: {0}")]
    InvalidPeerIdentifier(#[from] IdentityError),

    #[error("Connection timed out after {0} ms")]
    ConnectionTimeout(u64),

    #[error("Connection rejected: {0}")]
    ConnectionRejected(RejectReason),

    #[error("Malformed message: {0}")]
    MalformedMessage(#[from] WireError),

    #[error("Transport error: {0}")]
    TransportError(String),

    /// The transport itself is gone; nothing more can be sent or received
    #[error("Transport closed: {0}")]
    TransportClosed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Channel closed")]
    ChannelClosed,

    #[error("Outbound queue is full (max size: {max})")]
    QueueFull { max: usize },
}

impl From<RejectReason> for SessionError {
    fn from(reason: RejectReason) -> Self {
        SessionError::ConnectionRejected(reason)
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
