//! Shared game state and wire protocol for two-team capture-the-flag sessions.
//!
//! This crate has no I/O. The `domain` module holds the state mirror that
//! both peers keep converged; `protocol` holds the messages they exchange.

pub mod domain;
pub mod protocol;

pub use domain::{
    is_valid_peer_id, DamageOutcome, FlagEvent, FlagState, Flags, GameSnapshot, GameStateMirror,
    IdentityError, MatchRules, PeerIdentity, Player, PlayerFields, PlayerUpdate, Position,
    PowerUpEvent, PowerUpState, RemotePlayer, ScoreDelta, ScoreState, SnapshotOutcome, Team,
    TeamScore, Weapon, MAX_HEALTH,
};
pub use protocol::{WireError, WireMessage};
