use ctf_session_core::{PlayerFields, Position, Weapon};
use instant::Duration;

/// Speed of a rifle bullet in pixels per second
pub const BULLET_SPEED: f32 = 600.0;

/// A shot the pilot wants fired this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub weapon: Weapon,
    pub position: Position,
    pub angle: f32,
    pub speed: f32,
}

/// Headless stand-in for a human player: walks back and forth between two
/// points and fires along its heading at a fixed cadence.
#[derive(Debug, Clone)]
pub struct PatrolPilot {
    from: Position,
    to: Position,
    /// Pixels per second
    speed: f32,
    /// Progress along the leg, 0..=1
    progress: f32,
    outbound: bool,
    fire_every: Duration,
    since_fire: Duration,
}

impl PatrolPilot {
    pub fn new(from: Position, to: Position, speed: f32, fire_every: Duration) -> Self {
        Self {
            from,
            to,
            speed,
            progress: 0.0,
            outbound: true,
            fire_every,
            since_fire: Duration::ZERO,
        }
    }

    pub fn position(&self) -> Position {
        let (a, b) = self.leg();
        Position::new(
            a.x + (b.x - a.x) * self.progress,
            a.y + (b.y - a.y) * self.progress,
        )
    }

    /// Heading in radians
    pub fn rotation(&self) -> f32 {
        let (a, b) = self.leg();
        (b.y - a.y).atan2(b.x - a.x)
    }

    fn leg(&self) -> (Position, Position) {
        if self.outbound {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        }
    }

    /// Advance by `dt`. Returns the new local state and a shot if one is due.
    pub fn step(&mut self, dt: Duration) -> (PlayerFields, Option<Shot>) {
        let length = self.from.distance(&self.to);
        if length > 0.0 {
            self.progress += self.speed * dt.as_secs_f32() / length;
            if self.progress >= 1.0 {
                self.progress = 0.0;
                self.outbound = !self.outbound;
            }
        }

        let fields = PlayerFields::default()
            .position(self.position())
            .rotation(self.rotation());

        self.since_fire += dt;
        let shot = if self.since_fire >= self.fire_every {
            self.since_fire = Duration::ZERO;
            Some(Shot {
                weapon: Weapon::Rifle,
                position: self.position(),
                angle: self.rotation(),
                speed: BULLET_SPEED,
            })
        } else {
            None
        };

        (fields, shot)
    }
}
