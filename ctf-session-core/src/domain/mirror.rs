use crate::domain::{
    clamp_health, FlagEvent, Flags, MatchRules, PeerIdentity, Player, PlayerFields, Position,
    PowerUpEvent, PowerUpState, ScoreDelta, ScoreState, Team, MAX_HEALTH,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Full serialization of shared game state, used for periodic resync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Sorted by id
    pub players: Vec<Player>,
    pub flags: Flags,
    pub scores: ScoreState,
    pub power_up: PowerUpState,
}

/// Result of applying a player state update
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerUpdate {
    /// The update named the local identity
    Ignored,
    /// Unknown id; the update acted as an implicit join
    Joined(Player),
    Updated(Player),
    Unchanged,
}

/// Result of applying damage to a player
#[derive(Debug, Clone, PartialEq)]
pub struct DamageOutcome {
    pub target: PeerIdentity,
    pub health: u8,
    /// Health went from above zero to zero with this hit
    pub lethal: bool,
    pub local: bool,
}

/// What changed when a snapshot overwrote the mirror
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SnapshotOutcome {
    pub added: Vec<Player>,
    pub updated: Vec<Player>,
    pub removed: Vec<PeerIdentity>,
    pub flags_changed: bool,
    pub scores_changed: bool,
    pub power_up_changed: bool,
    /// Set the first time a team reaches the winning capture count
    pub winner: Option<Team>,
}

/// In-memory model of all networked entities.
///
/// On the host this is the source of truth; on the client it is a replica
/// that is periodically overwritten by host snapshots. The local player is
/// tracked separately and is never stored as a remote player.
#[derive(Debug, Clone)]
pub struct GameStateMirror {
    local: Player,
    /// Whether the presentation layer has reported the local player yet
    local_published: bool,
    players: BTreeMap<PeerIdentity, Player>,
    flags: Flags,
    scores: ScoreState,
    power_up: PowerUpState,
    rules: MatchRules,
    winner: Option<Team>,
}

impl GameStateMirror {
    pub fn new(local_id: PeerIdentity, team: Team, display_name: &str, rules: MatchRules) -> Self {
        let local = Player::new(local_id, team, rules.spawn_point(team))
            .with_display_name(display_name);

        Self {
            local,
            local_published: false,
            players: BTreeMap::new(),
            flags: Flags::new(&rules),
            scores: ScoreState::default(),
            power_up: PowerUpState::spawned_at(rules.power_up_spawn),
            rules,
            winner: None,
        }
    }

    // Queries

    pub fn local_id(&self) -> &PeerIdentity {
        &self.local.id
    }

    pub fn local_player(&self) -> &Player {
        &self.local
    }

    pub fn is_local(&self, id: &PeerIdentity) -> bool {
        self.local.id == *id
    }

    pub fn player(&self, id: &PeerIdentity) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    pub fn scores(&self) -> &ScoreState {
        &self.scores
    }

    pub fn power_up(&self) -> &PowerUpState {
        &self.power_up
    }

    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    pub fn winner(&self) -> Option<Team> {
        self.winner
    }

    /// Team of any known player, local included
    pub fn team_of(&self, id: &PeerIdentity) -> Option<Team> {
        if self.is_local(id) {
            Some(self.local.team)
        } else {
            self.players.get(id).map(|p| p.team)
        }
    }

    // Local player

    /// Record the presentation layer's view of the local player
    pub fn update_local(&mut self, fields: &PlayerFields) -> bool {
        self.local_published = true;
        self.local.apply_fields(fields)
    }

    pub fn is_local_published(&self) -> bool {
        self.local_published
    }

    /// Move the local player to `team` and put them on its spawn point
    pub fn assign_local_team(&mut self, team: Team) {
        self.local.team = team;
        self.local.position = self.rules.spawn_point(team);
    }

    // Remote players

    /// Create a remote player. No-op for the local id or a known id.
    pub fn apply_join(
        &mut self,
        id: PeerIdentity,
        team: Team,
        position: Option<Position>,
        display_name: &str,
    ) -> Option<Player> {
        if self.is_local(&id) || self.players.contains_key(&id) {
            return None;
        }

        let position = position.unwrap_or_else(|| self.rules.spawn_point(team));
        let player = Player::new(id.clone(), team, position).with_display_name(display_name);

        tracing::debug!("➕ Player {} joined on team {}", id, team);
        self.players.insert(id, player.clone());
        Some(player)
    }

    /// Merge a delta into a remote player, joining it implicitly if unknown
    pub fn apply_player_state(&mut self, id: &PeerIdentity, fields: &PlayerFields) -> PlayerUpdate {
        if self.is_local(id) {
            return PlayerUpdate::Ignored;
        }

        if let Some(player) = self.players.get_mut(id) {
            return if player.apply_fields(fields) {
                PlayerUpdate::Updated(player.clone())
            } else {
                PlayerUpdate::Unchanged
            };
        }

        let team = fields.team.unwrap_or(self.local.team.opponent());
        let position = fields
            .position
            .unwrap_or_else(|| self.rules.spawn_point(team));
        let mut player = Player::new(id.clone(), team, position);
        player.apply_fields(fields);

        tracing::debug!("➕ Player {} joined implicitly via state update", id);
        self.players.insert(id.clone(), player.clone());
        PlayerUpdate::Joined(player)
    }

    /// Subtract `amount` from the target's health, clamped to `0..=100`.
    ///
    /// Targets the local player when `target` is the local id. Unknown
    /// remote targets are ignored.
    pub fn apply_damage(&mut self, target: &PeerIdentity, amount: i32) -> Option<DamageOutcome> {
        let local = self.is_local(target);
        let player = if local {
            &mut self.local
        } else {
            self.players.get_mut(target)?
        };

        let before = player.health;
        player.health = clamp_health(before as i32 - amount.max(0));

        Some(DamageOutcome {
            target: target.clone(),
            health: player.health,
            lethal: before > 0 && player.health == 0,
            local,
        })
    }

    /// Restore a player to full health at `position`
    pub fn apply_respawn(&mut self, id: &PeerIdentity, position: Position) -> Option<Player> {
        let player = if self.is_local(id) {
            &mut self.local
        } else {
            self.players.get_mut(id)?
        };

        player.health = MAX_HEALTH;
        player.position = position;
        Some(player.clone())
    }

    /// Remove a remote player. A flag they carried goes back to base.
    pub fn remove_player(&mut self, id: &PeerIdentity) -> Option<Player> {
        let removed = self.players.remove(id)?;

        if let Some(flag) = self.flags.carried_by(id) {
            self.flags.apply(&FlagEvent::Return { flag }, &self.rules);
        }

        tracing::debug!("➖ Player {} removed", id);
        Some(removed)
    }

    /// Drop every remote player (session teardown)
    pub fn clear_players(&mut self) -> Vec<PeerIdentity> {
        let ids: Vec<PeerIdentity> = self.players.keys().cloned().collect();
        for id in &ids {
            self.remove_player(id);
        }
        ids
    }

    // Shared state

    pub fn apply_flag_event(&mut self, event: &FlagEvent) -> bool {
        self.flags.apply(event, &self.rules)
    }

    /// Apply a score increment. Returns the winner the first time the
    /// winning capture count is reached, and `None` on every later call.
    pub fn apply_score_delta(&mut self, delta: ScoreDelta) -> Option<Team> {
        self.scores.apply(delta);
        self.check_winner()
    }

    pub fn apply_power_up_event(&mut self, event: &PowerUpEvent) -> bool {
        self.power_up.apply(event)
    }

    // Snapshots

    /// Deterministic serialization of every player, both flags, the score
    /// and the power-up.
    ///
    /// The local player is included once the presentation layer has
    /// reported it, so the peer sees the snapshot's author as a remote player.
    pub fn snapshot(&self) -> GameSnapshot {
        let mut players: Vec<Player> = self.players.values().cloned().collect();
        if self.local_published {
            players.push(self.local.clone());
            players.sort_by(|a, b| a.id.cmp(&b.id));
        }

        GameSnapshot {
            players,
            flags: self.flags.clone(),
            scores: self.scores,
            power_up: self.power_up,
        }
    }

    /// Overwrite shared state from a snapshot.
    ///
    /// Afterwards the remote players are exactly the snapshot's players
    /// minus the local id, whose own state is never touched.
    pub fn apply_snapshot(&mut self, snapshot: GameSnapshot) -> SnapshotOutcome {
        let mut outcome = SnapshotOutcome::default();

        let incoming: BTreeMap<PeerIdentity, Player> = snapshot
            .players
            .into_iter()
            .filter(|p| !self.is_local(&p.id))
            .map(|mut p| {
                p.health = p.health.min(MAX_HEALTH);
                (p.id.clone(), p)
            })
            .collect();

        outcome.removed = self
            .players
            .keys()
            .filter(|id| !incoming.contains_key(*id))
            .cloned()
            .collect();

        for (id, player) in &incoming {
            match self.players.get(id) {
                None => outcome.added.push(player.clone()),
                Some(existing) if existing != player => outcome.updated.push(player.clone()),
                Some(_) => {}
            }
        }
        self.players = incoming;

        outcome.flags_changed = self.flags != snapshot.flags;
        self.flags = snapshot.flags;

        outcome.scores_changed = self.scores != snapshot.scores;
        self.scores = snapshot.scores;

        outcome.power_up_changed = self.power_up != snapshot.power_up;
        self.power_up = snapshot.power_up;

        outcome.winner = self.check_winner();
        outcome
    }

    fn check_winner(&mut self) -> Option<Team> {
        if self.winner.is_some() {
            return None;
        }
        self.winner = self.scores.leader_at(self.rules.winning_captures);
        if let Some(team) = self.winner {
            tracing::info!("🏆 Team {} reached {} captures", team, self.rules.winning_captures);
        }
        self.winner
    }
}
