pub mod channel;
pub mod connection;
pub mod error;
pub mod message;
pub mod transport;

pub use channel::{Channel, ChannelEvent, ChannelState};
pub use connection::MatchboxConnection;
pub use message::{ConnectRequest, Frame, Welcome, PROTOCOL_VERSION};
pub use transport::NetworkConnection;
