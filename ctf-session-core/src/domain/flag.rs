use crate::domain::{MatchRules, PeerIdentity, Position, Team};
use serde::{Deserialize, Serialize};

/// State of one team's flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagState {
    pub team: Team,
    pub position: Position,
    pub at_base: bool,
    /// Player currently holding the flag
    #[serde(default)]
    pub carrier: Option<PeerIdentity>,
}

impl FlagState {
    /// A flag sitting on its team's base
    pub fn at_base(team: Team, rules: &MatchRules) -> Self {
        Self {
            team,
            position: rules.spawn_point(team),
            at_base: true,
            carrier: None,
        }
    }

    fn reset(&mut self, rules: &MatchRules) {
        *self = Self::at_base(self.team, rules);
    }
}

/// Both flags. There are always exactly two for the lifetime of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flags {
    pub red: FlagState,
    pub blue: FlagState,
}

impl Flags {
    pub fn new(rules: &MatchRules) -> Self {
        Self {
            red: FlagState::at_base(Team::Red, rules),
            blue: FlagState::at_base(Team::Blue, rules),
        }
    }

    pub fn get(&self, team: Team) -> &FlagState {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
        }
    }

    pub fn get_mut(&mut self, team: Team) -> &mut FlagState {
        match team {
            Team::Red => &mut self.red,
            Team::Blue => &mut self.blue,
        }
    }

    /// The flag `carrier` is holding, if any
    pub fn carried_by(&self, carrier: &PeerIdentity) -> Option<Team> {
        Team::all()
            .into_iter()
            .find(|team| self.get(*team).carrier.as_ref() == Some(carrier))
    }

    /// Apply a flag transition. Returns true if either flag changed.
    pub fn apply(&mut self, event: &FlagEvent, rules: &MatchRules) -> bool {
        let before = self.clone();

        match event {
            FlagEvent::Pickup { flag, carrier } => {
                let state = self.get_mut(*flag);
                state.at_base = false;
                state.carrier = Some(carrier.clone());
            }
            FlagEvent::Drop { flag, position } => {
                let state = self.get_mut(*flag);
                state.at_base = false;
                state.carrier = None;
                state.position = *position;
            }
            FlagEvent::Return { flag } => self.get_mut(*flag).reset(rules),
            FlagEvent::Capture { by } => self.get_mut(by.opponent()).reset(rules),
        }

        *self != before
    }
}

/// Flag transitions driven by pickup, drop, return and capture
#[derive(Debug, Clone, PartialEq)]
pub enum FlagEvent {
    Pickup { flag: Team, carrier: PeerIdentity },
    /// Carrier died; the flag stays where it fell
    Drop { flag: Team, position: Position },
    Return { flag: Team },
    /// `by` brought the opponent's flag home
    Capture { by: Team },
}
