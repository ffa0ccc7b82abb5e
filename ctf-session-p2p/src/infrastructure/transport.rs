use crate::application::ConnectionEvent;
use crate::domain::PeerId;
use crate::infrastructure::connection::MatchboxConnection;
use crate::infrastructure::error::Result;

/// Raw data-channel operations (allows mocking in tests)
pub trait NetworkConnection {
    fn local_peer_id(&self) -> Option<PeerId>;
    fn connected_peers(&self) -> Vec<PeerId>;
    fn send_to(&mut self, peer: PeerId, data: Vec<u8>) -> Result<()>;
    fn poll_events(&mut self) -> Vec<ConnectionEvent>;
    /// Stop talking to one peer; its traffic is ignored from now on
    fn disconnect(&mut self, peer: PeerId);
    /// Tear down the whole transport
    fn close(&mut self);
}

impl NetworkConnection for MatchboxConnection {
    fn local_peer_id(&self) -> Option<PeerId> {
        MatchboxConnection::local_peer_id(self)
    }

    fn connected_peers(&self) -> Vec<PeerId> {
        MatchboxConnection::connected_peers(self)
    }

    fn send_to(&mut self, peer: PeerId, data: Vec<u8>) -> Result<()> {
        MatchboxConnection::send_to(self, peer, data)
    }

    fn poll_events(&mut self) -> Vec<ConnectionEvent> {
        MatchboxConnection::poll_events(self)
    }

    fn disconnect(&mut self, peer: PeerId) {
        MatchboxConnection::disconnect(self, peer)
    }

    fn close(&mut self) {
        MatchboxConnection::close(self)
    }
}
