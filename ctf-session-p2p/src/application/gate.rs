use crate::application::SessionConfig;
use crate::infrastructure::error::RejectReason;
use crate::infrastructure::ConnectRequest;
use ctf_session_core::PeerIdentity;

/// Admission control for incoming and outgoing connections.
///
/// Checks run in a fixed order and the first failure wins: capacity,
/// identifier shape, protocol version, then timestamp freshness.
#[derive(Debug, Clone)]
pub struct ConnectionGate {
    max_peers: usize,
    protocol_version: u32,
    freshness_window_ms: i64,
    active: usize,
}

impl ConnectionGate {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            max_peers: config.max_peers,
            protocol_version: config.protocol_version,
            freshness_window_ms: config.freshness_window_ms as i64,
            active: 0,
        }
    }

    pub fn has_capacity(&self) -> bool {
        self.active < self.max_peers
    }

    /// Decide on a client's connect request. `now_ms` is local wall-clock
    /// unix millis.
    pub fn admit(
        &self,
        request: &ConnectRequest,
        now_ms: i64,
    ) -> Result<PeerIdentity, RejectReason> {
        self.check_capacity()?;

        let id = PeerIdentity::parse(&request.peer_id).map_err(RejectReason::InvalidIdentifier)?;

        if request.version != self.protocol_version {
            return Err(RejectReason::VersionMismatch {
                expected: self.protocol_version,
                actual: request.version,
            });
        }

        let skew_ms = now_ms.saturating_sub(request.timestamp);
        if skew_ms.saturating_abs() > self.freshness_window_ms {
            return Err(RejectReason::StaleRequest { skew_ms });
        }

        Ok(id)
    }

    /// Outbound dial to a host: capacity and identifier shape only
    pub fn admit_outbound(&self, host_id: &str) -> Result<PeerIdentity, RejectReason> {
        self.check_capacity()?;
        PeerIdentity::parse(host_id).map_err(RejectReason::InvalidIdentifier)
    }

    fn check_capacity(&self) -> Result<(), RejectReason> {
        if self.has_capacity() {
            Ok(())
        } else {
            Err(RejectReason::AtCapacity {
                max: self.max_peers,
            })
        }
    }

    /// Count an admitted peer against capacity
    pub fn activate(&mut self) {
        self.active = (self.active + 1).min(self.max_peers);
    }

    pub fn release(&mut self) {
        self.active = self.active.saturating_sub(1);
    }
}
