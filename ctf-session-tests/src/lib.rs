use cucumber::World;
use ctf_session_core::{GameStateMirror, MatchRules, PeerIdentity, Team, WireMessage};
use ctf_session_p2p::{ConnectionGate, EventRouter, PresentationEvent, RejectReason, Role, SessionConfig};

/// Identity the world's own peer plays under
pub const LOCAL_ID: &str = "1700000000000-local";

/// Wall clock the gate scenarios run at
pub const NOW_MS: i64 = 1_700_000_000_000;

/// One peer's view of a match: its mirror, router and gate, without any
/// transport. Steps feed wire messages in and assert on what comes out.
#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct MatchWorld {
    /// Session settings (the system under test reads rules and gate limits from here)
    pub config: SessionConfig,

    pub role: Role,

    pub mirror: GameStateMirror,

    pub router: EventRouter,

    pub gate: ConnectionGate,

    /// Presentation events collected since the scenario started
    pub events: Vec<PresentationEvent>,

    /// Replies the router asked to send back, in order
    pub replies: Vec<WireMessage>,

    /// Outcome of the last admission decision
    pub last_admission: Option<Result<PeerIdentity, RejectReason>>,
}

impl MatchWorld {
    pub fn new() -> Self {
        Self::with(SessionConfig::default(), Role::Host, Team::Red)
    }

    pub fn with(config: SessionConfig, role: Role, team: Team) -> Self {
        let mirror = GameStateMirror::new(local_id(), team, "Local", config.rules.clone());
        Self {
            router: EventRouter::new(role),
            gate: ConnectionGate::new(&config),
            config,
            role,
            mirror,
            events: Vec::new(),
            replies: Vec::new(),
            last_admission: None,
        }
    }

    /// Restart as `role` on `team` with the given rules
    pub fn reset(&mut self, role: Role, team: Team, rules: MatchRules) {
        let mut config = self.config.clone();
        config.rules = rules;
        *self = Self::with(config, role, team);
    }

    /// Route an inbound message and keep any reply
    pub fn receive(&mut self, message: WireMessage) {
        if let Some(reply) = self.router.route(&mut self.mirror, message, &mut self.events) {
            self.replies.push(reply);
        }
    }

    /// Number of collected events matching `predicate`
    pub fn count(&self, predicate: impl Fn(&PresentationEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }
}

pub fn local_id() -> PeerIdentity {
    peer(LOCAL_ID)
}

/// Parse an identifier used in a feature file
pub fn peer(id: &str) -> PeerIdentity {
    PeerIdentity::parse(id).unwrap_or_else(|e| panic!("bad peer id {:?} in scenario: {}", id, e))
}

/// Parse a team name used in a feature file
pub fn team(name: &str) -> Team {
    match name.to_ascii_lowercase().as_str() {
        "red" => Team::Red,
        "blue" => Team::Blue,
        other => panic!("unknown team {:?} in scenario", other),
    }
}
