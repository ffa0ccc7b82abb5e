//! Peer-to-peer session layer for two-team capture-the-flag.
//!
//! A host and one client exchange game messages over a WebRTC data channel
//! brokered by a Matchbox signalling server. The host is authoritative and
//! periodically broadcasts full snapshots; both sides send throttled deltas
//! of their own player.

// Domain layer (core)
pub mod domain;

// Application layer (use cases)
pub mod application;

// Infrastructure layer (adapters)
pub mod infrastructure;

pub use application::{
    ConnectionEvent, ConnectionGate, EventRouter, GameSession, GameSessionBuilder, IceServer,
    PresentationEvent, ReplicationScheduler, Session, SessionConfig,
};
pub use domain::{PeerId, Role, SessionPhase};
pub use infrastructure::error::{RejectReason, Result, SessionError};
pub use infrastructure::{Channel, ChannelEvent, MatchboxConnection, NetworkConnection};
