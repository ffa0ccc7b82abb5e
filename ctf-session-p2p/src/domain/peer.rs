use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub use matchbox_socket::PeerId as MatchboxPeerId;

/// Socket-level handle for the remote end of the data channel.
///
/// Assigned by the signalling server and only meaningful to the transport.
/// The game never sees it: players are named by their `PeerIdentity`,
/// which is bound to a socket handle during the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(MatchboxPeerId);

impl PeerId {
    pub fn new(id: MatchboxPeerId) -> Self {
        Self(id)
    }

    /// Fresh handle, for in-memory transports
    pub fn random() -> Self {
        Self(MatchboxPeerId(Uuid::new_v4()))
    }

    pub fn inner(&self) -> MatchboxPeerId {
        self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
