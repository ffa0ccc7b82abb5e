pub mod flag;
pub mod identity;
pub mod mirror;
pub mod player;
pub mod power_up;
pub mod rules;
pub mod score;
pub mod team;

pub use flag::{FlagEvent, FlagState, Flags};
pub use identity::{is_valid_peer_id, IdentityError, PeerIdentity};
pub use mirror::{DamageOutcome, GameSnapshot, GameStateMirror, PlayerUpdate, SnapshotOutcome};
pub use player::{clamp_health, Player, PlayerFields, Position, RemotePlayer, MAX_HEALTH};
pub use power_up::{PowerUpEvent, PowerUpState};
pub use rules::MatchRules;
pub use score::{ScoreDelta, ScoreState, TeamScore};
pub use team::{Team, Weapon};
