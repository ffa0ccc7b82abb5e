use crate::domain::PeerId;
use ctf_session_core::{
    FlagState, PeerIdentity, Player, Position, PowerUpState, ScoreState, Team, Weapon,
};

/// Events emitted by the raw connection
#[derive(Debug, Clone)]
pub enum ConnectionEvent {
    PeerConnected(PeerId),
    PeerDisconnected(PeerId),
    MessageReceived { from: PeerId, data: Vec<u8> },
    /// The transport's background loop ended
    TransportClosed(String),
}

/// Calls into the presentation layer, queued for the driver to drain
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationEvent {
    /// Our own identity, for the host to share with the joining player
    ShowConnectionId(PeerIdentity),
    /// Handshake finished
    Connected { remote: PeerIdentity, team: Team },
    PlayerAdded(Player),
    PlayerRemoved(PeerIdentity),
    PlayerUpdated(Player),
    ProjectileSpawned {
        owner: PeerIdentity,
        weapon: Weapon,
        position: Position,
        angle: f32,
        speed: f32,
    },
    BulletHit {
        shooter: PeerIdentity,
        position: Position,
        target: Option<PeerIdentity>,
    },
    RocketHit {
        shooter: PeerIdentity,
        position: Position,
        target: Option<PeerIdentity>,
    },
    Damaged {
        target: PeerIdentity,
        health: u8,
        lethal: bool,
        /// The local player took the hit
        local: bool,
    },
    PlayerDied { id: PeerIdentity, team: Team },
    FlagChanged(FlagState),
    ScoreChanged(ScoreState),
    PowerUpChanged(PowerUpState),
    MatchWon(Team),
    ShowError(String),
    ConnectionLost,
}
