use crate::infrastructure::error::{Result, SessionError};
use ctf_session_core::{PeerIdentity, Team, WireError, WireMessage};
use serde::{Deserialize, Serialize};

/// Version of the handshake and game protocol spoken by this build
pub const PROTOCOL_VERSION: u32 = 1;

/// Client's opening request. Checked by the host's connection gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    /// Raw identifier so a malformed one still reaches the gate
    pub peer_id: String,
    pub version: u32,
    /// Sender's wall clock, unix millis
    pub timestamp: i64,
    #[serde(default)]
    pub display_name: String,
}

impl ConnectRequest {
    pub fn new(peer_id: &PeerIdentity, display_name: &str, timestamp: i64) -> Self {
        Self {
            peer_id: peer_id.as_str().to_string(),
            version: PROTOCOL_VERSION,
            timestamp,
            display_name: display_name.to_string(),
        }
    }
}

/// Host's acceptance of a connect request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Welcome {
    pub host_id: PeerIdentity,
    /// Team the host assigned to the joining client
    pub team: Team,
}

/// Envelope for everything on the data channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Frame {
    Hello(ConnectRequest),
    Welcome(Welcome),
    Game(WireMessage),
}

impl Frame {
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Hello(_) => "hello",
            Frame::Welcome(_) => "welcome",
            Frame::Game(msg) => msg.tag(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(SessionError::Serialization)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| SessionError::MalformedMessage(WireError::Decode(e.to_string())))
    }
}
