use ctf_session_core::MatchRules;
use instant::Duration;
use serde::{Deserialize, Serialize};

/// STUN/TURN server handed to WebRTC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceServer {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServer {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }

    pub fn turn(
        url: impl Into<String>,
        username: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            urls: vec![url.into()],
            username: Some(username.into()),
            credential: Some(credential.into()),
        }
    }

    pub fn default_stun_servers() -> Vec<Self> {
        vec![
            Self::stun("stun:stun.l.google.com:19302"),
            Self::stun("stun:stun1.l.google.com:19302"),
        ]
    }
}

/// Configuration for a game session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Matchbox signalling server URL; the room name is appended
    pub signalling_server: String,
    pub ice_servers: Vec<IceServer>,
    /// How often the driver should call `poll`
    pub poll_interval_ms: u64,

    /// Concurrent peers the gate admits
    pub max_peers: usize,
    pub protocol_version: u32,
    /// Client gives up if the host has not welcomed it by then
    pub connect_timeout_ms: u64,
    /// Maximum clock skew accepted on a connect request
    pub freshness_window_ms: u64,

    pub delta_interval_ms: u64,
    /// Minimum movement, in pixels, that makes the local player dirty
    pub position_threshold: f32,
    /// Minimum turn, in radians, that makes the local player dirty
    pub rotation_threshold: f32,
    /// Host full-state broadcast period
    pub snapshot_interval_ms: u64,
    pub power_up_respawn_ms: u64,

    pub outbound_queue_size: usize,
    /// Messages flushed per poll
    pub batch_size: usize,

    pub rules: MatchRules,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            signalling_server: "ws://localhost:3536".to_string(),
            ice_servers: IceServer::default_stun_servers(),
            poll_interval_ms: 16,
            max_peers: 1,
            protocol_version: crate::infrastructure::PROTOCOL_VERSION,
            connect_timeout_ms: 5000,
            freshness_window_ms: 30_000,
            delta_interval_ms: 50,
            position_threshold: 1.0,
            rotation_threshold: 0.05,
            snapshot_interval_ms: 1000,
            power_up_respawn_ms: 10_000,
            outbound_queue_size: 256,
            batch_size: 32,
            rules: MatchRules::default(),
        }
    }
}

impl SessionConfig {
    pub fn new(signalling_server: impl Into<String>) -> Self {
        Self {
            signalling_server: signalling_server.into(),
            ..Default::default()
        }
    }

    pub fn with_ice_servers(mut self, servers: Vec<IceServer>) -> Self {
        self.ice_servers = servers;
        self
    }

    pub fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    pub fn with_connect_timeout(mut self, ms: u64) -> Self {
        self.connect_timeout_ms = ms;
        self
    }

    pub fn with_delta_interval(mut self, ms: u64) -> Self {
        self.delta_interval_ms = ms;
        self
    }

    pub fn with_snapshot_interval(mut self, ms: u64) -> Self {
        self.snapshot_interval_ms = ms;
        self
    }

    pub fn with_power_up_respawn(mut self, ms: u64) -> Self {
        self.power_up_respawn_ms = ms;
        self
    }

    pub fn with_winning_captures(mut self, captures: u32) -> Self {
        self.rules = self.rules.with_winning_captures(captures);
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn delta_interval(&self) -> Duration {
        Duration::from_millis(self.delta_interval_ms)
    }

    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_millis(self.snapshot_interval_ms)
    }

    pub fn power_up_respawn(&self) -> Duration {
        Duration::from_millis(self.power_up_respawn_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
