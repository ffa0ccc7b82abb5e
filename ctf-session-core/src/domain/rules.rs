use crate::domain::{Position, Team};
use serde::{Deserialize, Serialize};

/// Arena tile size in pixels
pub const TILE_SIZE: f32 = 32.0;
/// Arena width in tiles
pub const ARENA_TILES_WIDE: u32 = 25;
/// Arena height in tiles
pub const ARENA_TILES_HIGH: u32 = 19;

/// Gameplay constants shared by both peers.
///
/// Both sides must agree on these; the handshake only checks the protocol
/// version, so changing a default here is a protocol change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRules {
    /// Captures needed to win the match
    pub winning_captures: u32,
    /// Arena width in pixels
    pub arena_width: f32,
    /// Arena height in pixels
    pub arena_height: f32,
    /// Slack around the arena before a position counts as implausible
    pub bounds_margin: f32,
    pub red_spawn: Position,
    pub blue_spawn: Position,
    /// Where the power-up appears when it respawns
    pub power_up_spawn: Position,
}

impl Default for MatchRules {
    fn default() -> Self {
        let arena_width = ARENA_TILES_WIDE as f32 * TILE_SIZE;
        let arena_height = ARENA_TILES_HIGH as f32 * TILE_SIZE;
        let spawn_y = arena_height - 200.0;

        Self {
            winning_captures: 3,
            arena_width,
            arena_height,
            bounds_margin: 64.0,
            red_spawn: Position::new(100.0, spawn_y),
            blue_spawn: Position::new(arena_width - 100.0, spawn_y),
            power_up_spawn: Position::new(arena_width / 2.0, spawn_y - 100.0),
        }
    }
}

impl MatchRules {
    pub fn with_winning_captures(mut self, captures: u32) -> Self {
        self.winning_captures = captures;
        self
    }

    /// Spawn point (and flag base) for a team
    pub fn spawn_point(&self, team: Team) -> Position {
        match team {
            Team::Red => self.red_spawn,
            Team::Blue => self.blue_spawn,
        }
    }

    /// Coarse plausibility check: finite and inside the arena plus margin
    pub fn contains(&self, position: Position) -> bool {
        position.is_finite()
            && position.x >= -self.bounds_margin
            && position.y >= -self.bounds_margin
            && position.x <= self.arena_width + self.bounds_margin
            && position.y <= self.arena_height + self.bounds_margin
    }
}
