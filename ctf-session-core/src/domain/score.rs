use crate::domain::Team;
use serde::{Deserialize, Serialize};

/// Per-team tallies. Never decrease within a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeamScore {
    pub captures: u32,
    pub kills: u32,
}

/// Score for both teams, keyed on the wire as `{"red": .., "blue": ..}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreState {
    pub red: TeamScore,
    pub blue: TeamScore,
}

/// Increment to apply to one team's score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreDelta {
    pub team: Team,
    pub captures: u32,
    pub kills: u32,
}

impl ScoreDelta {
    pub fn capture(team: Team) -> Self {
        Self {
            team,
            captures: 1,
            kills: 0,
        }
    }

    pub fn kill(team: Team) -> Self {
        Self {
            team,
            captures: 0,
            kills: 1,
        }
    }
}

impl ScoreState {
    pub fn get(&self, team: Team) -> &TeamScore {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
        }
    }

    fn get_mut(&mut self, team: Team) -> &mut TeamScore {
        match team {
            Team::Red => &mut self.red,
            Team::Blue => &mut self.blue,
        }
    }

    pub fn apply(&mut self, delta: ScoreDelta) {
        let score = self.get_mut(delta.team);
        score.captures = score.captures.saturating_add(delta.captures);
        score.kills = score.kills.saturating_add(delta.kills);
    }

    /// First team (red before blue) with at least `threshold` captures
    pub fn leader_at(&self, threshold: u32) -> Option<Team> {
        Team::all()
            .into_iter()
            .find(|team| self.get(*team).captures >= threshold)
    }
}
