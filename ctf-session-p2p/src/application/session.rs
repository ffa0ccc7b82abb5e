use crate::domain::{Role, SessionPhase};
use crate::infrastructure::{Channel, NetworkConnection};
use ctf_session_core::PeerIdentity;

/// One peer-to-peer game session. Owns the data channel exclusively.
pub struct Session<C: NetworkConnection> {
    local_id: PeerIdentity,
    role: Role,
    phase: SessionPhase,
    remote_id: Option<PeerIdentity>,
    channel: Channel<C>,
}

impl<C: NetworkConnection> Session<C> {
    pub fn new(local_id: PeerIdentity, role: Role, channel: Channel<C>) -> Self {
        Self {
            local_id,
            role,
            phase: SessionPhase::Opening,
            remote_id: None,
            channel,
        }
    }

    pub fn local_id(&self) -> &PeerIdentity {
        &self.local_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Identity of the peer on the other end, after the handshake
    pub fn remote_id(&self) -> Option<&PeerIdentity> {
        self.remote_id.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.phase == SessionPhase::Active && self.channel.is_open()
    }

    pub fn channel(&self) -> &Channel<C> {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut Channel<C> {
        &mut self.channel
    }

    /// Handshake complete
    pub fn activate(&mut self, remote_id: PeerIdentity) {
        if self.phase != SessionPhase::Opening {
            return;
        }
        tracing::info!("🤝 {} session active with {}", self.role, remote_id);
        self.remote_id = Some(remote_id);
        self.phase = SessionPhase::Active;
    }

    /// Close the session and its channel. Returns false if already closed.
    pub fn close(&mut self) -> bool {
        if self.phase == SessionPhase::Closed {
            return false;
        }
        self.phase = SessionPhase::Closed;
        self.channel.close();
        true
    }
}
