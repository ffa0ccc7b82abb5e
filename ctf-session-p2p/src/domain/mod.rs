mod peer;
mod role;

pub use peer::{MatchboxPeerId, PeerId};
pub use role::{Role, SessionPhase};
