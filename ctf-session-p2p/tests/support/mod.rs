#![allow(dead_code)]

pub mod mock_connection;

use ctf_session_core::{PeerIdentity, Team};
use ctf_session_p2p::{GameSession, PresentationEvent, SessionConfig};
use instant::{Duration, Instant};
use mock_connection::{create_mock_network, MockConnection, MockNetwork};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Simulated frame length
pub const FRAME_MS: u64 = 16;

/// Route session logs to the test harness; `RUST_LOG` overrides the level
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_test_writer())
        .try_init();
}

/// A host and a client on an in-memory network, driven by a simulated clock
pub struct SessionFixture {
    pub host: GameSession<MockConnection>,
    pub client: GameSession<MockConnection>,
    pub network: Arc<Mutex<MockNetwork>>,
    pub now: Instant,
    pub host_events: Vec<PresentationEvent>,
    pub client_events: Vec<PresentationEvent>,
}

impl SessionFixture {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        init_test_tracing();
        let network = create_mock_network();
        let now = Instant::now();

        let host = Self::create_host(&network, config.clone());
        let client = Self::create_client(&network, host.local_id(), config, now);

        Self {
            host,
            client,
            network,
            now,
            host_events: Vec::new(),
            client_events: Vec::new(),
        }
    }

    pub fn create_host(
        network: &Arc<Mutex<MockNetwork>>,
        config: SessionConfig,
    ) -> GameSession<MockConnection> {
        GameSession::host(
            MockConnection::new(network.clone()),
            PeerIdentity::generate(),
            Team::Red,
            "Host",
            config,
        )
    }

    pub fn create_client(
        network: &Arc<Mutex<MockNetwork>>,
        host_id: &PeerIdentity,
        config: SessionConfig,
        now: Instant,
    ) -> GameSession<MockConnection> {
        GameSession::join(
            MockConnection::new(network.clone()),
            PeerIdentity::generate(),
            host_id.as_str(),
            "Client",
            config,
            now,
        )
        .expect("host id is well formed")
    }

    /// Advance the clock one frame at a time, polling host then client
    pub fn tick(&mut self, frames: usize) {
        for _ in 0..frames {
            self.now += Duration::from_millis(FRAME_MS);
            self.host.poll(self.now);
            self.client.poll(self.now);
            self.host_events.extend(self.host.drain_events());
            self.client_events.extend(self.client.drain_events());
        }
    }

    /// Jump the clock forward, then run one frame
    pub fn advance(&mut self, ms: u64) {
        self.now += Duration::from_millis(ms);
        self.tick(1);
    }

    /// Run the handshake and the initial snapshot exchange
    pub fn connect(&mut self) {
        self.tick(5);
        assert!(self.host.is_connected(), "host should be connected");
        assert!(self.client.is_connected(), "client should be connected");
    }

    pub fn clear_events(&mut self) {
        self.host_events.clear();
        self.client_events.clear();
    }

    pub fn count<F>(events: &[PresentationEvent], predicate: F) -> usize
    where
        F: Fn(&PresentationEvent) -> bool,
    {
        events.iter().filter(|e| predicate(e)).count()
    }
}
