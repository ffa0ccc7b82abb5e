use crate::application::ConnectionEvent;
use crate::domain::PeerId;
use crate::infrastructure::error::{Result, SessionError};
use crate::infrastructure::message::Frame;
use crate::infrastructure::transport::NetworkConnection;
use ctf_session_core::WireMessage;
use instant::{Duration, Instant};

/// Where the data channel is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Listening (host) or not yet dialled (client)
    Idle,
    /// Client waiting for the host's welcome
    Connecting { deadline: Instant },
    Open { peer: PeerId },
    Closed,
}

/// What a poll of the channel produced
#[derive(Debug)]
pub enum ChannelEvent {
    /// Transport-level link to a peer came up; no handshake yet
    PeerConnected(PeerId),
    Frame { from: PeerId, frame: Frame },
    /// Bytes that did not decode; already logged
    Malformed { from: PeerId },
    /// A peer that never completed the handshake went away
    PeerLeft(PeerId),
    /// The open peer went away. The channel is now closed.
    Closed(PeerId),
    /// No welcome arrived before the deadline. The channel is now closed.
    TimedOut,
    /// The transport under the channel died. The channel is now closed.
    TransportClosed(String),
}

/// The single session data channel bound to one remote peer.
///
/// Sending only works while open; anything sent in another state is
/// dropped with a warning.
pub struct Channel<C: NetworkConnection> {
    connection: C,
    state: ChannelState,
    connect_timeout: Duration,
    /// Set when a send found the transport dead; reported on the next poll
    failure: Option<String>,
}

impl<C: NetworkConnection> Channel<C> {
    pub fn new(connection: C, connect_timeout: Duration) -> Self {
        Self {
            connection,
            state: ChannelState::Idle,
            connect_timeout,
            failure: None,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ChannelState::Open { .. })
    }

    pub fn is_closed(&self) -> bool {
        self.state == ChannelState::Closed
    }

    /// Remote transport peer, once open
    pub fn peer(&self) -> Option<PeerId> {
        match self.state {
            ChannelState::Open { peer } => Some(peer),
            _ => None,
        }
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    /// Start the connect timer. Only meaningful from `Idle`.
    pub fn connect(&mut self, now: Instant) {
        if self.state == ChannelState::Idle {
            self.state = ChannelState::Connecting {
                deadline: now + self.connect_timeout,
            };
        }
    }

    /// Bind the channel to `peer` after a successful handshake
    pub fn open(&mut self, peer: PeerId) {
        if self.is_closed() {
            tracing::warn!("Refusing to open a closed channel to {}", peer);
            return;
        }
        tracing::info!("✅ Channel open to {}", peer);
        self.state = ChannelState::Open { peer };
    }

    /// Send a game message to the bound peer.
    ///
    /// Returns false when nothing went out.
    pub fn send(&mut self, message: &WireMessage) -> bool {
        let Some(peer) = self.peer() else {
            tracing::warn!("⚠️ Dropping {}: channel not open", message.tag());
            return false;
        };

        match self.send_frame_to(peer, &Frame::Game(message.clone())) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("❌ Failed to send {}: {}", message.tag(), e);
                false
            }
        }
    }

    /// Send a frame to a specific peer regardless of channel state
    pub fn send_frame_to(&mut self, peer: PeerId, frame: &Frame) -> Result<()> {
        let data = frame.encode()?;
        tracing::trace!("📤 {} → {} ({} bytes)", frame.kind(), peer, data.len());
        let result = self.connection.send_to(peer, data);
        if let Err(SessionError::TransportClosed(reason)) = &result {
            if self.failure.is_none() && !self.is_closed() {
                self.failure = Some(reason.clone());
            }
        }
        result
    }

    /// Hang up on a peer that is not the bound one
    pub fn reject(&mut self, peer: PeerId) {
        self.connection.disconnect(peer);
    }

    pub fn poll(&mut self, now: Instant) -> Vec<ChannelEvent> {
        if self.is_closed() {
            return Vec::new();
        }

        if let Some(reason) = self.failure.take() {
            self.state = ChannelState::Closed;
            self.connection.close();
            return vec![ChannelEvent::TransportClosed(reason)];
        }

        let mut events = Vec::new();

        for event in self.connection.poll_events() {
            match event {
                ConnectionEvent::PeerConnected(peer) => {
                    events.push(ChannelEvent::PeerConnected(peer));
                }
                ConnectionEvent::PeerDisconnected(peer) => {
                    if self.peer() == Some(peer) {
                        self.state = ChannelState::Closed;
                        events.push(ChannelEvent::Closed(peer));
                    } else {
                        events.push(ChannelEvent::PeerLeft(peer));
                    }
                }
                ConnectionEvent::MessageReceived { from, data } => match Frame::decode(&data) {
                    Ok(frame) => {
                        tracing::trace!("📥 {} ← {}", frame.kind(), from);
                        events.push(ChannelEvent::Frame { from, frame });
                    }
                    Err(e) => {
                        tracing::warn!("⚠️ Dropping {} bytes from {}: {}", data.len(), from, e);
                        events.push(ChannelEvent::Malformed { from });
                    }
                },
                ConnectionEvent::TransportClosed(reason) => {
                    self.state = ChannelState::Closed;
                    self.connection.close();
                    events.push(ChannelEvent::TransportClosed(reason));
                }
            }

            if self.is_closed() {
                break;
            }
        }

        if let ChannelState::Connecting { deadline } = self.state {
            if now >= deadline {
                tracing::warn!("⏰ No welcome within {:?}", self.connect_timeout);
                self.state = ChannelState::Closed;
                self.connection.close();
                events.push(ChannelEvent::TimedOut);
            }
        }

        events
    }

    /// Close the channel and the transport under it. Idempotent.
    pub fn close(&mut self) {
        if self.state != ChannelState::Closed {
            self.state = ChannelState::Closed;
        }
        self.connection.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctf_session_core::protocol::PowerupCollectPayload;
    use ctf_session_core::PeerIdentity;
    use std::collections::VecDeque;

    /// Scripted connection: events are queued by the test, sends recorded
    #[derive(Default)]
    struct ScriptedConnection {
        incoming: VecDeque<ConnectionEvent>,
        sent: Vec<(PeerId, Vec<u8>)>,
        disconnected: Vec<PeerId>,
        closed: bool,
        /// Sends fail as if the socket loop had ended
        dead: bool,
    }

    impl NetworkConnection for ScriptedConnection {
        fn local_peer_id(&self) -> Option<PeerId> {
            None
        }

        fn connected_peers(&self) -> Vec<PeerId> {
            Vec::new()
        }

        fn send_to(&mut self, peer: PeerId, data: Vec<u8>) -> Result<()> {
            if self.dead {
                return Err(SessionError::TransportClosed("loop ended".to_string()));
            }
            self.sent.push((peer, data));
            Ok(())
        }

        fn poll_events(&mut self) -> Vec<ConnectionEvent> {
            self.incoming.drain(..).collect()
        }

        fn disconnect(&mut self, peer: PeerId) {
            self.disconnected.push(peer);
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    fn peer() -> PeerId {
        PeerId::random()
    }

    fn channel() -> Channel<ScriptedConnection> {
        Channel::new(ScriptedConnection::default(), Duration::from_millis(5000))
    }

    fn collect_message() -> WireMessage {
        WireMessage::PowerupCollect(PowerupCollectPayload {
            id: PeerIdentity::parse("1-abc").unwrap(),
        })
    }

    #[test]
    fn test_send_before_open_is_dropped() {
        let mut channel = channel();
        assert!(!channel.send(&collect_message()));
        assert!(channel.connection().sent.is_empty());
    }

    #[test]
    fn test_send_after_open_reaches_bound_peer() {
        let mut channel = channel();
        let remote = peer();
        channel.open(remote);

        assert!(channel.send(&collect_message()));
        assert_eq!(channel.connection().sent.len(), 1);
        assert_eq!(channel.connection().sent[0].0, remote);
    }

    #[test]
    fn test_connect_times_out() {
        let mut channel = channel();
        let start = Instant::now();
        channel.connect(start);

        assert!(channel.poll(start + Duration::from_millis(4999)).is_empty());

        let events = channel.poll(start + Duration::from_millis(5000));
        assert!(matches!(events.as_slice(), [ChannelEvent::TimedOut]));
        assert!(channel.is_closed());
        assert!(channel.connection().closed);
    }

    #[test]
    fn test_open_cancels_connect_timer() {
        let mut channel = channel();
        let start = Instant::now();
        channel.connect(start);
        channel.open(peer());

        assert!(channel.poll(start + Duration::from_secs(60)).is_empty());
        assert!(channel.is_open());
    }

    #[test]
    fn test_bound_peer_disconnect_closes_channel() {
        let mut channel = channel();
        let remote = peer();
        let other = peer();
        channel.open(remote);

        channel
            .connection_mut()
            .incoming
            .push_back(ConnectionEvent::PeerDisconnected(other));
        channel
            .connection_mut()
            .incoming
            .push_back(ConnectionEvent::PeerDisconnected(remote));

        let events = channel.poll(Instant::now());
        assert!(matches!(events[0], ChannelEvent::PeerLeft(p) if p == other));
        assert!(matches!(events[1], ChannelEvent::Closed(p) if p == remote));
        assert!(channel.is_closed());
        assert!(!channel.send(&collect_message()));
    }

    #[test]
    fn test_undecodable_bytes_become_malformed() {
        let mut channel = channel();
        let remote = peer();
        channel
            .connection_mut()
            .incoming
            .push_back(ConnectionEvent::MessageReceived {
                from: remote,
                data: b"{not json".to_vec(),
            });

        let events = channel.poll(Instant::now());
        assert!(matches!(events.as_slice(), [ChannelEvent::Malformed { from }] if *from == remote));
    }

    #[test]
    fn test_transport_closed_event_closes_channel() {
        let mut channel = channel();
        channel.open(peer());
        channel
            .connection_mut()
            .incoming
            .push_back(ConnectionEvent::TransportClosed("Closed".to_string()));

        let events = channel.poll(Instant::now());
        assert!(matches!(events.as_slice(), [ChannelEvent::TransportClosed(r)] if r == "Closed"));
        assert!(channel.is_closed());
        assert!(channel.connection().closed);
    }

    #[test]
    fn test_send_on_dead_transport_is_reported_on_next_poll() {
        let mut channel = channel();
        channel.open(peer());
        channel.connection_mut().dead = true;

        assert!(!channel.send(&collect_message()));
        assert!(channel.is_open());

        let events = channel.poll(Instant::now());
        assert!(matches!(events.as_slice(), [ChannelEvent::TransportClosed(_)]));
        assert!(channel.is_closed());
        assert!(channel.poll(Instant::now()).is_empty());
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut channel = channel();
        channel.close();
        channel.close();
        assert!(channel.is_closed());
        assert!(channel.poll(Instant::now()).is_empty());
    }
}
