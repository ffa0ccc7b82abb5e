mod game_session;
mod message_queue;
mod session_builder;

pub use game_session::GameSession;
pub use message_queue::{MessageQueue, QueueError};
pub use session_builder::GameSessionBuilder;
