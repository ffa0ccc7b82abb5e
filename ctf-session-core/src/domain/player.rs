use crate::domain::{PeerIdentity, Team, Weapon};
use serde::{Deserialize, Serialize};

/// Full health. Health is always kept in `0..=MAX_HEALTH`.
pub const MAX_HEALTH: u8 = 100;

/// Clamp an arbitrary (possibly negative or overflowing) health value
pub fn clamp_health(value: i32) -> u8 {
    value.clamp(0, MAX_HEALTH as i32) as u8
}

/// World position in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A networked player as seen by the mirror
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PeerIdentity,
    pub team: Team,
    pub position: Position,
    /// Radians
    pub rotation: f32,
    pub health: u8,
    pub current_weapon: Weapon,
    #[serde(default)]
    pub display_name: String,
}

/// The mirror's view of a peer other than the local identity
pub type RemotePlayer = Player;

impl Player {
    pub fn new(id: PeerIdentity, team: Team, position: Position) -> Self {
        Self {
            id,
            team,
            position,
            rotation: 0.0,
            health: MAX_HEALTH,
            current_weapon: Weapon::default(),
            display_name: String::new(),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Merge a partial update. Returns true if anything changed.
    pub fn apply_fields(&mut self, fields: &PlayerFields) -> bool {
        let before = self.clone();

        if let Some(team) = fields.team {
            self.team = team;
        }
        if let Some(position) = fields.position {
            self.position = position;
        }
        if let Some(rotation) = fields.rotation {
            self.rotation = rotation;
        }
        if let Some(health) = fields.health {
            self.health = clamp_health(health);
        }
        if let Some(weapon) = fields.current_weapon {
            self.current_weapon = weapon;
        }
        if let Some(name) = &fields.display_name {
            self.display_name.clone_from(name);
        }

        *self != before
    }
}

/// Partial player update; `None` leaves the field untouched
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    /// Signed so out-of-range values can be clamped instead of rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_weapon: Option<Weapon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl PlayerFields {
    /// Every tracked field of `player`
    pub fn from_player(player: &Player) -> Self {
        Self {
            team: Some(player.team),
            position: Some(player.position),
            rotation: Some(player.rotation),
            health: Some(player.health as i32),
            current_weapon: Some(player.current_weapon),
            display_name: Some(player.display_name.clone()),
        }
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn rotation(mut self, rotation: f32) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn health(mut self, health: i32) -> Self {
        self.health = Some(health);
        self
    }

    pub fn weapon(mut self, weapon: Weapon) -> Self {
        self.current_weapon = Some(weapon);
        self
    }
}
