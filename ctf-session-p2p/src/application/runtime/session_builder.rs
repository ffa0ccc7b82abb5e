use crate::application::runtime::GameSession;
use crate::application::SessionConfig;
use crate::infrastructure::error::{Result, SessionError};
use crate::infrastructure::MatchboxConnection;
use ctf_session_core::{PeerIdentity, Team};
use instant::Instant;

/// Builds a [`GameSession`] over a real Matchbox connection.
///
/// The host's identity is the signalling room name, so a client joins by
/// dialling `<signalling_server>/<host id>`.
pub struct GameSessionBuilder {
    config: SessionConfig,
    display_name: String,
    team: Team,
    local_id: Option<PeerIdentity>,
}

impl GameSessionBuilder {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            display_name: String::new(),
            team: Team::Red,
            local_id: None,
        }
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Team the host plays on; the client gets the other one
    pub fn team(mut self, team: Team) -> Self {
        self.team = team;
        self
    }

    /// Use a fixed identity instead of minting one
    pub fn local_id(mut self, id: PeerIdentity) -> Self {
        self.local_id = Some(id);
        self
    }

    fn room_url(&self, room: &PeerIdentity) -> String {
        format!(
            "{}/{}",
            self.config.signalling_server.trim_end_matches('/'),
            room
        )
    }

    pub async fn build_host(self) -> Result<GameSession<MatchboxConnection>> {
        let local_id = self.local_id.clone().unwrap_or_else(PeerIdentity::generate);
        let room_url = self.room_url(&local_id);

        let connection =
            MatchboxConnection::connect(&room_url, self.config.ice_servers.clone()).await?;

        Ok(GameSession::host(
            connection,
            local_id,
            self.team,
            &self.display_name,
            self.config,
        ))
    }

    pub async fn build_client(self, host_id: &str) -> Result<GameSession<MatchboxConnection>> {
        let host = PeerIdentity::parse(host_id).map_err(SessionError::InvalidPeerIdentifier)?;
        let local_id = self.local_id.clone().unwrap_or_else(PeerIdentity::generate);
        let room_url = self.room_url(&host);

        let connection =
            MatchboxConnection::connect(&room_url, self.config.ice_servers.clone()).await?;

        GameSession::join(
            connection,
            local_id,
            host.as_str(),
            &self.display_name,
            self.config,
            Instant::now(),
        )
    }
}
