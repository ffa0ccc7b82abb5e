use crate::domain::{PeerIdentity, Position};
use serde::{Deserialize, Serialize};

/// The single power-up pickup on the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUpState {
    pub active: bool,
    pub visible: bool,
    pub position: Position,
}

impl PowerUpState {
    pub fn spawned_at(position: Position) -> Self {
        Self {
            active: true,
            visible: true,
            position,
        }
    }

    pub fn apply(&mut self, event: &PowerUpEvent) -> bool {
        let before = *self;
        match event {
            PowerUpEvent::Collect { .. } => {
                self.active = false;
                self.visible = false;
            }
            PowerUpEvent::Respawn { position } => *self = Self::spawned_at(*position),
        }
        *self != before
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PowerUpEvent {
    Collect { by: PeerIdentity },
    Respawn { position: Position },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_then_respawn() {
        let mut state = PowerUpState::spawned_at(Position::new(400.0, 200.0));

        let collected = state.apply(&PowerUpEvent::Collect {
            by: PeerIdentity::parse("1-a").unwrap(),
        });
        assert!(collected);
        assert!(!state.active && !state.visible);

        // Collecting an already collected power-up changes nothing
        assert!(!state.apply(&PowerUpEvent::Collect {
            by: PeerIdentity::parse("1-b").unwrap(),
        }));

        state.apply(&PowerUpEvent::Respawn {
            position: Position::new(300.0, 250.0),
        });
        assert!(state.active && state.visible);
        assert_eq!(state.position, Position::new(300.0, 250.0));
    }
}
