use crate::application::SessionConfig;
use crate::domain::Role;
use ctf_session_core::protocol::StatePayload;
use ctf_session_core::{GameStateMirror, Player, PlayerFields, Position, Weapon, WireMessage};
use instant::{Duration, Instant};

/// Repeating deadline. Inert until started; `cancel` stops it for good
/// until the next `start`.
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    next_due: Option<Instant>,
}

impl Interval {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// Returns true at most once per call when the period has elapsed.
    /// Missed periods are not replayed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                let mut next = due + self.period;
                if next <= now {
                    next = now + self.period;
                }
                self.next_due = Some(next);
                true
            }
            _ => false,
        }
    }
}

/// One-shot deadline
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    deadline: Option<Instant>,
}

impl Countdown {
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fires once, then disarms
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Last local state that went out on the wire
#[derive(Debug, Clone, Copy, PartialEq)]
struct SentState {
    position: Position,
    rotation: f32,
    health: u8,
    weapon: Weapon,
}

impl From<&Player> for SentState {
    fn from(player: &Player) -> Self {
        Self {
            position: player.position,
            rotation: player.rotation,
            health: player.health,
            weapon: player.current_weapon,
        }
    }
}

/// Rate-limited, dirty-checked local player deltas.
///
/// At most one delta per interval, and only when the local player moved
/// or turned past a threshold since the last one sent, or its health or
/// weapon changed.
#[derive(Debug, Clone)]
pub struct DeltaThrottle {
    interval: Duration,
    position_threshold: f32,
    rotation_threshold: f32,
    last_sent: Option<SentState>,
    last_sent_at: Option<Instant>,
}

impl DeltaThrottle {
    pub fn new(interval: Duration, position_threshold: f32, rotation_threshold: f32) -> Self {
        Self {
            interval,
            position_threshold,
            rotation_threshold,
            last_sent: None,
            last_sent_at: None,
        }
    }

    fn is_dirty(&self, current: &SentState) -> bool {
        let Some(last) = &self.last_sent else {
            return true;
        };

        current.position.distance(&last.position) > self.position_threshold
            || (current.rotation - last.rotation).abs() > self.rotation_threshold
            || current.health != last.health
            || current.weapon != last.weapon
    }

    /// The delta to send now, if any. Records it as sent.
    pub fn poll(&mut self, now: Instant, local: &Player) -> Option<PlayerFields> {
        if let Some(at) = self.last_sent_at {
            if now.saturating_duration_since(at) < self.interval {
                return None;
            }
        }

        let current = SentState::from(local);
        if !self.is_dirty(&current) {
            return None;
        }

        self.last_sent = Some(current);
        self.last_sent_at = Some(now);

        Some(
            PlayerFields::default()
                .position(current.position)
                .rotation(current.rotation)
                .health(current.health as i32)
                .weapon(current.weapon),
        )
    }

    /// Forget the last sent state so the next poll sends a full delta
    pub fn reset(&mut self) {
        self.last_sent = None;
        self.last_sent_at = None;
    }
}

/// Decides what local state goes out and when: throttled player deltas on
/// both sides, plus the periodic full snapshot on the host.
#[derive(Debug, Clone)]
pub struct ReplicationScheduler {
    role: Role,
    delta: DeltaThrottle,
    broadcast: Interval,
    running: bool,
}

impl ReplicationScheduler {
    pub fn new(role: Role, config: &SessionConfig) -> Self {
        Self {
            role,
            delta: DeltaThrottle::new(
                config.delta_interval(),
                config.position_threshold,
                config.rotation_threshold,
            ),
            broadcast: Interval::new(config.snapshot_interval()),
            running: false,
        }
    }

    /// Begin replicating. Starts the broadcast timer on the host.
    pub fn start(&mut self, now: Instant) {
        self.running = true;
        self.delta.reset();
        if self.role.is_host() {
            self.broadcast.start(now);
        }
    }

    /// Stop replicating and cancel every timer
    pub fn cancel(&mut self) {
        self.running = false;
        self.broadcast.cancel();
        self.delta.reset();
    }

    /// Messages due at `now`
    pub fn poll(&mut self, now: Instant, mirror: &GameStateMirror) -> Vec<WireMessage> {
        let mut due = Vec::new();
        if !self.running {
            return due;
        }

        if mirror.is_local_published() {
            if let Some(fields) = self.delta.poll(now, mirror.local_player()) {
                due.push(WireMessage::State(StatePayload {
                    id: mirror.local_id().clone(),
                    fields,
                }));
            }
        }

        if self.broadcast.poll(now) {
            tracing::trace!("📡 Snapshot broadcast due");
            due.push(WireMessage::GameStateSnapshot(mirror.snapshot()));
        }

        due
    }
}
