use crate::application::PresentationEvent;
use crate::domain::Role;
use ctf_session_core::protocol::{
    CapturePayload, DamagePayload, DeathPayload, FlagPayload, HitPayload, JoinPayload,
    PowerupCollectPayload, PowerupRespawnPayload, RespawnPayload, ShootPayload, StatePayload,
};
use ctf_session_core::{
    FlagEvent, GameSnapshot, GameStateMirror, PeerIdentity, PlayerUpdate, PowerUpEvent, ScoreDelta,
    Team, WireMessage,
};

/// Applies game messages to the mirror and turns them into presentation
/// events.
///
/// Every message kind has exactly one handler. A handler may produce one
/// outbound reply; today only the host's answer to a join does.
#[derive(Debug)]
pub struct EventRouter {
    role: Role,
    dropped: u64,
}

impl EventRouter {
    pub fn new(role: Role) -> Self {
        Self { role, dropped: 0 }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Inbound messages discarded by validation
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Handle a message that arrived over the channel bound to `sender`.
    ///
    /// The bound peer speaks only for itself, so a message whose actor is
    /// anyone else is dropped before it can touch the mirror.
    pub fn route_from(
        &mut self,
        sender: &PeerIdentity,
        mirror: &mut GameStateMirror,
        message: WireMessage,
        events: &mut Vec<PresentationEvent>,
    ) -> Option<WireMessage> {
        if let Some(actor) = message.actor() {
            if actor != sender {
                tracing::warn!(
                    "⚠️ Dropping {} from {} that names {} as sender",
                    message.tag(),
                    sender,
                    actor
                );
                self.dropped += 1;
                return None;
            }
        }
        self.route(mirror, message, events)
    }

    /// Handle a message from the remote peer.
    ///
    /// Invalid messages, messages claiming to come from the local player
    /// and snapshots arriving at the host are dropped with a warning.
    pub fn route(
        &mut self,
        mirror: &mut GameStateMirror,
        message: WireMessage,
        events: &mut Vec<PresentationEvent>,
    ) -> Option<WireMessage> {
        if let Err(e) = message.validate(mirror.rules()) {
            tracing::warn!("⚠️ Dropping {}: {}", message.tag(), e);
            self.dropped += 1;
            return None;
        }

        if let Some(actor) = message.actor() {
            if mirror.is_local(actor) {
                tracing::warn!("⚠️ Dropping {} that names the local player as sender", message.tag());
                self.dropped += 1;
                return None;
            }
        }

        if self.role.is_host() && matches!(message, WireMessage::GameStateSnapshot(_)) {
            tracing::warn!("⚠️ Host ignores snapshots from clients");
            self.dropped += 1;
            return None;
        }

        tracing::debug!("📥 Routing {}", message.tag());
        self.dispatch(mirror, message, events, true)
    }

    /// Apply a message this peer is about to send, so the local mirror
    /// reflects it without waiting for an echo
    pub fn apply_local(
        &self,
        mirror: &mut GameStateMirror,
        message: &WireMessage,
        events: &mut Vec<PresentationEvent>,
    ) {
        self.dispatch(mirror, message.clone(), events, false);
    }

    fn dispatch(
        &self,
        mirror: &mut GameStateMirror,
        message: WireMessage,
        events: &mut Vec<PresentationEvent>,
        inbound: bool,
    ) -> Option<WireMessage> {
        match message {
            WireMessage::Join(p) => return self.on_join(mirror, p, events, inbound),
            WireMessage::State(p) => on_state(mirror, p, events),
            WireMessage::Shoot(p) => on_shoot(p, events),
            WireMessage::BulletHit(p) => on_hit(mirror, p, false, events),
            WireMessage::RocketHit(p) => on_hit(mirror, p, true, events),
            WireMessage::Damage(p) => on_damage(mirror, p, events),
            WireMessage::FlagPickup(p) => on_flag_pickup(mirror, p, events),
            WireMessage::FlagReturn(p) => on_flag_return(mirror, p, events),
            WireMessage::FlagCapture(p) => on_flag_capture(mirror, p, events),
            WireMessage::PlayerDeath(p) => on_death(mirror, p, events),
            WireMessage::PlayerRespawn(p) => on_respawn(mirror, p, events),
            WireMessage::PowerupCollect(p) => on_powerup_collect(mirror, p, events),
            WireMessage::PowerupRespawn(p) => on_powerup_respawn(mirror, p, events),
            WireMessage::GameStateSnapshot(s) => on_snapshot(mirror, s, events),
        }
        None
    }

    fn on_join(
        &self,
        mirror: &mut GameStateMirror,
        p: JoinPayload,
        events: &mut Vec<PresentationEvent>,
        inbound: bool,
    ) -> Option<WireMessage> {
        let opponent = mirror.local_player().team.opponent();
        let team = match self.role {
            Role::Host => opponent,
            Role::Client => p.team.unwrap_or(opponent),
        };

        if let Some(player) = mirror.apply_join(p.id, team, p.position, &p.display_name) {
            tracing::info!("👤 {} joined team {}", player.id, player.team);
            events.push(PresentationEvent::PlayerAdded(player));
        }

        if self.role.is_host() && inbound {
            Some(WireMessage::GameStateSnapshot(mirror.snapshot()))
        } else {
            None
        }
    }
}

fn on_state(mirror: &mut GameStateMirror, p: StatePayload, events: &mut Vec<PresentationEvent>) {
    match mirror.apply_player_state(&p.id, &p.fields) {
        PlayerUpdate::Joined(player) => events.push(PresentationEvent::PlayerAdded(player)),
        PlayerUpdate::Updated(player) => events.push(PresentationEvent::PlayerUpdated(player)),
        PlayerUpdate::Ignored | PlayerUpdate::Unchanged => {}
    }
}

fn on_shoot(p: ShootPayload, events: &mut Vec<PresentationEvent>) {
    events.push(PresentationEvent::ProjectileSpawned {
        owner: p.id,
        weapon: p.weapon,
        position: p.position,
        angle: p.angle,
        speed: p.speed,
    });
}

fn on_hit(
    mirror: &mut GameStateMirror,
    p: HitPayload,
    rocket: bool,
    events: &mut Vec<PresentationEvent>,
) {
    let event = if rocket {
        PresentationEvent::RocketHit {
            shooter: p.id,
            position: p.position,
            target: p.target_id.clone(),
        }
    } else {
        PresentationEvent::BulletHit {
            shooter: p.id,
            position: p.position,
            target: p.target_id.clone(),
        }
    };
    events.push(event);

    if let (Some(target), Some(amount)) = (p.target_id, p.damage) {
        apply_damage(mirror, &target, amount, events);
    }
}

fn on_damage(mirror: &mut GameStateMirror, p: DamagePayload, events: &mut Vec<PresentationEvent>) {
    apply_damage(mirror, &p.target_id, p.amount, events);
}

fn apply_damage(
    mirror: &mut GameStateMirror,
    target: &PeerIdentity,
    amount: i32,
    events: &mut Vec<PresentationEvent>,
) {
    match mirror.apply_damage(target, amount) {
        Some(outcome) => {
            if outcome.local {
                tracing::info!("💥 Took {} damage, health {}", amount, outcome.health);
            }
            events.push(PresentationEvent::Damaged {
                target: outcome.target,
                health: outcome.health,
                lethal: outcome.lethal,
                local: outcome.local,
            });
        }
        None => tracing::debug!("Damage for unknown player {} ignored", target),
    }
}

fn on_flag_pickup(mirror: &mut GameStateMirror, p: FlagPayload, events: &mut Vec<PresentationEvent>) {
    let event = FlagEvent::Pickup {
        flag: p.flag,
        carrier: p.id,
    };
    if mirror.apply_flag_event(&event) {
        push_flag(mirror, p.flag, events);
    }
}

fn on_flag_return(mirror: &mut GameStateMirror, p: FlagPayload, events: &mut Vec<PresentationEvent>) {
    if mirror.apply_flag_event(&FlagEvent::Return { flag: p.flag }) {
        push_flag(mirror, p.flag, events);
    }
}

fn on_flag_capture(
    mirror: &mut GameStateMirror,
    p: CapturePayload,
    events: &mut Vec<PresentationEvent>,
) {
    if mirror.apply_flag_event(&FlagEvent::Capture { by: p.team }) {
        push_flag(mirror, p.team.opponent(), events);
    }

    let winner = mirror.apply_score_delta(ScoreDelta::capture(p.team));
    tracing::info!("🚩 {} captured a flag", p.team);
    push_scores(mirror, winner, events);
}

fn on_death(mirror: &mut GameStateMirror, p: DeathPayload, events: &mut Vec<PresentationEvent>) {
    events.push(PresentationEvent::PlayerDied {
        id: p.id.clone(),
        team: p.team,
    });

    let carried = p.dropped_flag.or_else(|| mirror.flags().carried_by(&p.id));
    if let Some(flag) = carried {
        let event = FlagEvent::Drop {
            flag,
            position: p.position,
        };
        if mirror.apply_flag_event(&event) {
            push_flag(mirror, flag, events);
        }
    }

    let winner = mirror.apply_score_delta(ScoreDelta::kill(p.team.opponent()));
    push_scores(mirror, winner, events);
}

fn on_respawn(mirror: &mut GameStateMirror, p: RespawnPayload, events: &mut Vec<PresentationEvent>) {
    if mirror.is_local(&p.id) {
        mirror.apply_respawn(&p.id, p.position);
        return;
    }
    if let Some(player) = mirror.apply_respawn(&p.id, p.position) {
        events.push(PresentationEvent::PlayerUpdated(player));
    }
}

fn on_powerup_collect(
    mirror: &mut GameStateMirror,
    p: PowerupCollectPayload,
    events: &mut Vec<PresentationEvent>,
) {
    if mirror.apply_power_up_event(&PowerUpEvent::Collect { by: p.id }) {
        events.push(PresentationEvent::PowerUpChanged(*mirror.power_up()));
    }
}

fn on_powerup_respawn(
    mirror: &mut GameStateMirror,
    p: PowerupRespawnPayload,
    events: &mut Vec<PresentationEvent>,
) {
    let event = PowerUpEvent::Respawn {
        position: p.position,
    };
    if mirror.apply_power_up_event(&event) {
        events.push(PresentationEvent::PowerUpChanged(*mirror.power_up()));
    }
}

fn on_snapshot(
    mirror: &mut GameStateMirror,
    snapshot: GameSnapshot,
    events: &mut Vec<PresentationEvent>,
) {
    let outcome = mirror.apply_snapshot(snapshot);

    events.extend(outcome.added.into_iter().map(PresentationEvent::PlayerAdded));
    events.extend(outcome.updated.into_iter().map(PresentationEvent::PlayerUpdated));
    events.extend(outcome.removed.into_iter().map(PresentationEvent::PlayerRemoved));

    if outcome.flags_changed {
        for team in Team::all() {
            push_flag(mirror, team, events);
        }
    }
    if outcome.scores_changed {
        events.push(PresentationEvent::ScoreChanged(*mirror.scores()));
    }
    if outcome.power_up_changed {
        events.push(PresentationEvent::PowerUpChanged(*mirror.power_up()));
    }
    if let Some(team) = outcome.winner {
        tracing::info!("🏆 Team {} wins", team);
        events.push(PresentationEvent::MatchWon(team));
    }
}

fn push_flag(mirror: &GameStateMirror, team: Team, events: &mut Vec<PresentationEvent>) {
    events.push(PresentationEvent::FlagChanged(mirror.flags().get(team).clone()));
}

fn push_scores(mirror: &GameStateMirror, winner: Option<Team>, events: &mut Vec<PresentationEvent>) {
    events.push(PresentationEvent::ScoreChanged(*mirror.scores()));
    if let Some(team) = winner {
        tracing::info!("🏆 Team {} wins", team);
        events.push(PresentationEvent::MatchWon(team));
    }
}
