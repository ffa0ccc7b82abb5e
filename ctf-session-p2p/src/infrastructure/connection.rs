use crate::application::{ConnectionEvent, IceServer};
use crate::domain::PeerId;
use crate::infrastructure::error::{Result, SessionError};
use matchbox_socket::{PeerState, RtcIceServerConfig, WebRtcSocket, WebRtcSocketBuilder};
use std::collections::HashSet;

/// How long to wait for the signalling server to hand out our socket id
const SIGNALLING_TIMEOUT_MS: u64 = 5000;

/// WebRTC data channel over Matchbox signalling.
///
/// One reliable, ordered channel. The socket is dropped on `close`, which
/// ends the background loop and closes every data channel.
pub struct MatchboxConnection {
    socket: Option<WebRtcSocket>,
    local_peer_id: Option<PeerId>,
    /// Peers we refused; matchbox has no per-peer hang-up
    blocked: HashSet<PeerId>,
}

impl MatchboxConnection {
    /// Join the signalling room at `room_url`
    pub async fn connect(room_url: &str, ice_servers: Vec<IceServer>) -> Result<Self> {
        tracing::info!("🔌 Connecting to signalling room: {}", room_url);
        for server in &ice_servers {
            tracing::debug!(
                "   ICE: {}{}",
                server.urls.join(", "),
                if server.username.is_some() { " (with auth)" } else { "" }
            );
        }

        let (mut socket, loop_fut) = WebRtcSocketBuilder::new(room_url)
            .ice_server(build_ice_server_config(&ice_servers))
            .add_channel(matchbox_socket::ChannelConfig::reliable())
            .build();

        let matchbox_span = tracing::info_span!("matchbox::webrtc_loop");

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(async move {
            let _enter = matchbox_span.enter();
            if let Err(e) = loop_fut.await {
                tracing::warn!("Matchbox loop ended: {:?}", e);
            }
        });

        #[cfg(not(target_arch = "wasm32"))]
        {
            #[cfg(feature = "native")]
            tokio::spawn(async move {
                let _enter = matchbox_span.enter();
                if let Err(e) = loop_fut.await {
                    tracing::warn!("Matchbox loop ended: {:?}", e);
                }
            });

            #[cfg(not(feature = "native"))]
            compile_error!("Non-WASM builds require the 'native' feature to be enabled");
        }

        let peer_id = wait_for_peer_id(&mut socket).await?;
        tracing::info!("✅ Signalling assigned socket id {}", peer_id);

        Ok(Self {
            socket: Some(socket),
            local_peer_id: Some(peer_id),
            blocked: HashSet::new(),
        })
    }

    pub fn local_peer_id(&self) -> Option<PeerId> {
        self.local_peer_id
    }

    pub fn is_closed(&self) -> bool {
        self.socket.is_none()
    }

    pub fn connected_peers(&self) -> Vec<PeerId> {
        match &self.socket {
            Some(socket) => socket
                .connected_peers()
                .map(PeerId::new)
                .filter(|p| !self.blocked.contains(p))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn send_to(&mut self, peer: PeerId, data: Vec<u8>) -> Result<()> {
        if self.blocked.contains(&peer) {
            return Err(SessionError::TransportError(format!(
                "peer {} was disconnected",
                peer
            )));
        }
        let socket = self.socket.as_mut().ok_or(SessionError::ChannelClosed)?;

        let len = data.len();
        socket
            .get_channel_mut(0)
            .map_err(|e| SessionError::TransportClosed(e.to_string()))?
            .try_send(data.into_boxed_slice(), peer.inner())
            .map_err(|e| SessionError::TransportClosed(e.to_string()))?;

        tracing::trace!("Sent {} bytes to peer {}", len, peer);
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<ConnectionEvent> {
        let mut events = Vec::new();
        let Some(socket) = self.socket.as_mut() else {
            return events;
        };

        let updates = match socket.try_update_peers() {
            Ok(updates) => updates,
            Err(e) => {
                tracing::error!("❌ Matchbox loop is gone: {}", e);
                self.socket = None;
                events.push(ConnectionEvent::TransportClosed(e.to_string()));
                return events;
            }
        };

        for (peer_id, state) in updates {
            let peer = PeerId::new(peer_id);
            if self.blocked.contains(&peer) {
                continue;
            }
            match state {
                PeerState::Connected => {
                    tracing::info!("🟢 Peer connected: {}", peer);
                    events.push(ConnectionEvent::PeerConnected(peer));
                }
                PeerState::Disconnected => {
                    tracing::info!("🔴 Peer disconnected: {}", peer);
                    events.push(ConnectionEvent::PeerDisconnected(peer));
                }
            }
        }

        let packets = match socket.get_channel_mut(0) {
            Ok(channel) => channel.receive(),
            Err(e) => {
                tracing::error!("❌ Data channel unavailable: {}", e);
                self.socket = None;
                events.push(ConnectionEvent::TransportClosed(e.to_string()));
                return events;
            }
        };

        for (peer_id, packet) in packets {
            let peer = PeerId::new(peer_id);
            if self.blocked.contains(&peer) {
                tracing::trace!("Dropping {} bytes from blocked peer {}", packet.len(), peer);
                continue;
            }
            events.push(ConnectionEvent::MessageReceived {
                from: peer,
                data: packet.to_vec(),
            });
        }

        events
    }

    pub fn disconnect(&mut self, peer: PeerId) {
        if self.blocked.insert(peer) {
            tracing::info!("🚫 Ignoring peer {} from now on", peer);
        }
    }

    pub fn close(&mut self) {
        if self.socket.take().is_some() {
            tracing::info!("🔴 Transport closed");
        }
    }
}

/// Matchbox takes a single ICE server entry; the first one wins
fn build_ice_server_config(ice_servers: &[IceServer]) -> RtcIceServerConfig {
    match ice_servers.first() {
        Some(server) => RtcIceServerConfig {
            urls: server.urls.clone(),
            username: server.username.clone(),
            credential: server.credential.clone(),
        },
        None => RtcIceServerConfig::default(),
    }
}

async fn wait_for_peer_id(socket: &mut WebRtcSocket) -> Result<PeerId> {
    use instant::Duration;

    let start = instant::Instant::now();
    let timeout = Duration::from_millis(SIGNALLING_TIMEOUT_MS);

    loop {
        socket.try_update_peers().map_err(|e| {
            SessionError::TransportClosed(format!("signalling loop ended: {}", e))
        })?;

        if let Some(id) = socket.id() {
            return Ok(PeerId::new(id));
        }

        if start.elapsed() > timeout {
            return Err(SessionError::ConnectionTimeout(SIGNALLING_TIMEOUT_MS));
        }

        platform_sleep(10).await;
    }
}

#[cfg(target_arch = "wasm32")]
async fn platform_sleep(millis: u32) {
    gloo_timers::future::TimeoutFuture::new(millis).await;
}

#[cfg(not(target_arch = "wasm32"))]
async fn platform_sleep(millis: u32) {
    #[cfg(feature = "native")]
    tokio::time::sleep(instant::Duration::from_millis(millis as u64)).await;

    #[cfg(not(feature = "native"))]
    compile_error!("Non-WASM builds require the 'native' feature to be enabled");
}
