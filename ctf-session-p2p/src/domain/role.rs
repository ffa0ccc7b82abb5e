use std::fmt;

/// Which side of the session this process plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Owns the authoritative mirror and runs the full-state broadcast
    Host,
    /// Connects to a host and treats its snapshots as authoritative
    Client,
}

impl Role {
    pub fn is_host(self) -> bool {
        matches!(self, Role::Host)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Host => write!(f, "Host"),
            Role::Client => write!(f, "Client"),
        }
    }
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Transport is up, waiting for a peer to pass the handshake
    Opening,
    /// Handshake done; replication and routing are attached
    Active,
    /// Torn down. Terminal.
    Closed,
}
