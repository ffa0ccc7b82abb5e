mod config;
mod events;
mod gate;
mod router;
pub mod runtime;
pub mod scheduler;
mod session;

pub use config::{IceServer, SessionConfig};
pub use events::{ConnectionEvent, PresentationEvent};
pub use gate::ConnectionGate;
pub use router::EventRouter;
pub use runtime::{GameSession, GameSessionBuilder, MessageQueue, QueueError};
pub use scheduler::{Countdown, DeltaThrottle, Interval, ReplicationScheduler};
pub use session::Session;
