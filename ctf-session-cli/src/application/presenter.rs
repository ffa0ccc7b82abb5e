use ctf_session_core::{PeerIdentity, ScoreState, Team};
use ctf_session_p2p::PresentationEvent;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// What the driver loop should do after presenting an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Logs presentation events to the console and keeps a small scoreboard
#[derive(Debug, Default)]
pub struct ConsolePresenter {
    remote_players: BTreeSet<PeerIdentity>,
    scores: ScoreState,
    winner: Option<Team>,
    join_hint: Option<String>,
}

impl ConsolePresenter {
    /// `join_hint` is printed with the connection id so the host can share
    /// a ready-made join command
    pub fn new(join_hint: Option<String>) -> Self {
        Self {
            join_hint,
            ..Default::default()
        }
    }

    pub fn remote_players(&self) -> usize {
        self.remote_players.len()
    }

    pub fn scores(&self) -> &ScoreState {
        &self.scores
    }

    pub fn winner(&self) -> Option<Team> {
        self.winner
    }

    pub fn present(&mut self, event: &PresentationEvent) -> Flow {
        match event {
            PresentationEvent::ShowConnectionId(id) => {
                info!("📋 Connection id: {}", id);
                if let Some(hint) = &self.join_hint {
                    info!("   Share this command to join:");
                    info!("   {} --host-id {}", hint, id);
                }
            }
            PresentationEvent::Connected { remote, team } => {
                info!("✅ Connected to {}; playing for {}", remote, team);
            }
            PresentationEvent::PlayerAdded(player) => {
                self.remote_players.insert(player.id.clone());
                info!(
                    "👤 {} ({}) joined team {}",
                    player.display_name, player.id, player.team
                );
            }
            PresentationEvent::PlayerRemoved(id) => {
                self.remote_players.remove(id);
                info!("👋 {} left", id);
            }
            PresentationEvent::PlayerUpdated(player) => {
                tracing::debug!(
                    "{} at ({:.0}, {:.0}) hp {}",
                    player.id,
                    player.position.x,
                    player.position.y,
                    player.health
                );
            }
            PresentationEvent::ProjectileSpawned { owner, weapon, .. } => {
                tracing::debug!("🔫 {} fired {}", owner, weapon);
            }
            PresentationEvent::BulletHit { shooter, target, .. }
            | PresentationEvent::RocketHit { shooter, target, .. } => {
                if let Some(target) = target {
                    tracing::debug!("🎯 {} hit {}", shooter, target);
                }
            }
            PresentationEvent::Damaged {
                target,
                health,
                lethal,
                local,
            } => {
                let who = if *local { "You" } else { target.as_str() };
                if *lethal {
                    info!("💀 {} went down", who);
                } else {
                    info!("💥 {} took damage, health {}", who, health);
                }
            }
            PresentationEvent::PlayerDied { id, team } => {
                info!("💀 {} ({}) died", id, team);
            }
            PresentationEvent::FlagChanged(flag) => match &flag.carrier {
                Some(carrier) => info!("🚩 {} flag carried by {}", flag.team, carrier),
                None if flag.at_base => info!("🚩 {} flag is home", flag.team),
                None => info!(
                    "🚩 {} flag dropped at ({:.0}, {:.0})",
                    flag.team, flag.position.x, flag.position.y
                ),
            },
            PresentationEvent::ScoreChanged(scores) => {
                self.scores = *scores;
                info!(
                    "📊 Red {} / Blue {} captures",
                    scores.red.captures, scores.blue.captures
                );
            }
            PresentationEvent::PowerUpChanged(power_up) => {
                if power_up.active {
                    info!("⭐ Power-up available");
                } else {
                    info!("⭐ Power-up taken");
                }
            }
            PresentationEvent::MatchWon(team) => {
                self.winner = Some(*team);
                info!("🏆 Team {} wins!", team);
                return Flow::Stop;
            }
            PresentationEvent::ShowError(message) => {
                warn!("❌ {}", message);
            }
            PresentationEvent::ConnectionLost => {
                warn!("🔴 Connection to game lost");
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    /// Final scoreboard as JSON
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "scores": self.scores,
            "winner": self.winner,
            "remotePlayers": self.remote_players.len(),
        })
    }
}
