use ctf_session_p2p::domain::PeerId;
use ctf_session_p2p::{ConnectionEvent, NetworkConnection, Result, SessionError};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

type Inbox = Arc<Mutex<VecDeque<(PeerId, Vec<u8>)>>>;

/// Shared in-memory bus standing in for signalling plus data channels
#[derive(Default)]
pub struct MockNetwork {
    pub peers: HashMap<PeerId, Inbox>,
    /// Connection events addressed to a peer
    pub events: VecDeque<(PeerId, ConnectionEvent)>,
    /// Peers whose socket loop has ended
    pub dead: HashSet<PeerId>,
}

pub fn create_mock_network() -> Arc<Mutex<MockNetwork>> {
    Arc::new(Mutex::new(MockNetwork::default()))
}

/// End `peer`'s socket loop: its next poll reports the transport closed and
/// its sends fail
pub fn kill_transport(network: &Arc<Mutex<MockNetwork>>, peer: PeerId) {
    network.lock().unwrap().dead.insert(peer);
}

/// One peer's view of the mock network. Delivery is synchronous; a message
/// sent now shows up on the receiver's next poll.
pub struct MockConnection {
    local_id: PeerId,
    network: Arc<Mutex<MockNetwork>>,
    inbox: Inbox,
    blocked: HashSet<PeerId>,
    closed: bool,
}

impl MockConnection {
    /// Join the network; every existing peer and the newcomer see each
    /// other connect
    pub fn new(network: Arc<Mutex<MockNetwork>>) -> Self {
        let local_id = PeerId::random();
        let inbox: Inbox = Arc::new(Mutex::new(VecDeque::new()));

        {
            let mut net = network.lock().unwrap();
            let existing: Vec<PeerId> = net.peers.keys().copied().collect();
            for peer in existing {
                net.events
                    .push_back((local_id, ConnectionEvent::PeerConnected(peer)));
                net.events
                    .push_back((peer, ConnectionEvent::PeerConnected(local_id)));
            }
            net.peers.insert(local_id, inbox.clone());
        }

        Self {
            local_id,
            network,
            inbox,
            blocked: HashSet::new(),
            closed: false,
        }
    }

    pub fn id(&self) -> PeerId {
        self.local_id
    }
}

impl NetworkConnection for MockConnection {
    fn local_peer_id(&self) -> Option<PeerId> {
        Some(self.local_id)
    }

    fn connected_peers(&self) -> Vec<PeerId> {
        if self.closed {
            return Vec::new();
        }
        self.network
            .lock()
            .unwrap()
            .peers
            .keys()
            .filter(|&&id| id != self.local_id && !self.blocked.contains(&id))
            .copied()
            .collect()
    }

    fn send_to(&mut self, peer: PeerId, data: Vec<u8>) -> Result<()> {
        if self.closed {
            return Err(SessionError::ChannelClosed);
        }
        let network = self.network.lock().unwrap();
        if network.dead.contains(&self.local_id) {
            return Err(SessionError::TransportClosed("Closed".to_string()));
        }
        if self.blocked.contains(&peer) {
            return Err(SessionError::TransportError(format!("{} is blocked", peer)));
        }

        match network.peers.get(&peer) {
            Some(inbox) => {
                inbox.lock().unwrap().push_back((self.local_id, data));
                Ok(())
            }
            None => Err(SessionError::TransportError(format!(
                "peer {} not found",
                peer
            ))),
        }
    }

    fn poll_events(&mut self) -> Vec<ConnectionEvent> {
        if self.closed {
            return Vec::new();
        }

        let mut events = Vec::new();
        {
            let mut network = self.network.lock().unwrap();
            if network.dead.contains(&self.local_id) {
                return vec![ConnectionEvent::TransportClosed("Closed".to_string())];
            }
            let mut remaining = VecDeque::new();
            for (target, event) in network.events.drain(..) {
                if target == self.local_id {
                    events.push(event);
                } else {
                    remaining.push_back((target, event));
                }
            }
            network.events = remaining;
        }

        events.retain(|event| match event {
            ConnectionEvent::PeerConnected(p) | ConnectionEvent::PeerDisconnected(p) => {
                !self.blocked.contains(p)
            }
            ConnectionEvent::MessageReceived { from, .. } => !self.blocked.contains(from),
            ConnectionEvent::TransportClosed(_) => true,
        });

        let mut inbox = self.inbox.lock().unwrap();
        while let Some((from, data)) = inbox.pop_front() {
            if !self.blocked.contains(&from) {
                events.push(ConnectionEvent::MessageReceived { from, data });
            }
        }

        events
    }

    fn disconnect(&mut self, peer: PeerId) {
        self.blocked.insert(peer);
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let mut network = self.network.lock().unwrap();
        network.peers.remove(&self.local_id);
        let others: Vec<PeerId> = network.peers.keys().copied().collect();
        for peer in others {
            network
                .events
                .push_back((peer, ConnectionEvent::PeerDisconnected(self.local_id)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_connection_delivers_after_connect_event() {
        let network = create_mock_network();
        let mut a = MockConnection::new(network.clone());
        let mut b = MockConnection::new(network.clone());

        a.send_to(b.id(), b"hi".to_vec()).unwrap();

        let events = b.poll_events();
        assert!(matches!(events[0], ConnectionEvent::PeerConnected(p) if p == a.id()));
        assert!(matches!(&events[1], ConnectionEvent::MessageReceived { data, .. } if data == b"hi"));
    }

    #[test]
    fn test_close_notifies_remaining_peers() {
        let network = create_mock_network();
        let mut a = MockConnection::new(network.clone());
        let mut b = MockConnection::new(network.clone());
        b.poll_events();

        a.close();

        let events = b.poll_events();
        assert!(matches!(events[..], [ConnectionEvent::PeerDisconnected(p)] if p == a.id()));
        assert!(a.send_to(b.id(), vec![1]).is_err());
    }
}
