use crate::application::runtime::MessageQueue;
use crate::application::scheduler::Countdown;
use crate::application::{
    ConnectionGate, EventRouter, PresentationEvent, ReplicationScheduler, Session, SessionConfig,
};
use crate::domain::{PeerId, Role, SessionPhase};
use crate::infrastructure::error::{RejectReason, Result, SessionError};
use crate::infrastructure::{
    Channel, ChannelEvent, ConnectRequest, Frame, NetworkConnection, Welcome,
};
use ctf_session_core::protocol::{
    CapturePayload, DamagePayload, DeathPayload, FlagPayload, HitPayload, JoinPayload,
    PowerupCollectPayload, PowerupRespawnPayload, RespawnPayload, ShootPayload,
};
use ctf_session_core::{
    GameStateMirror, PeerIdentity, PlayerFields, Position, Team, Weapon, WireMessage,
};
use instant::Instant;
use std::collections::HashMap;

/// Drives one game session: handshake, routing, replication and the
/// outbound mailbox.
///
/// Call [`GameSession::poll`] every frame, then [`GameSession::drain_events`]
/// to feed the presentation layer. Generic over the connection so tests can
/// run it over an in-memory network.
pub struct GameSession<C: NetworkConnection> {
    session: Session<C>,
    config: SessionConfig,
    display_name: String,
    /// Host the client dialled; its welcome must match
    expected_host: Option<PeerIdentity>,
    gate: ConnectionGate,
    router: EventRouter,
    scheduler: ReplicationScheduler,
    mirror: GameStateMirror,
    outbound: MessageQueue,
    /// Host: transport peers that have not sent their hello yet
    pending: HashMap<PeerId, Instant>,
    power_up_respawn: Countdown,
    /// Time of the latest poll, for timers armed by the sender API
    clock: Instant,
    events: Vec<PresentationEvent>,
}

impl<C: NetworkConnection> GameSession<C> {
    /// Open a session that waits for one client to join
    pub fn host(
        connection: C,
        local_id: PeerIdentity,
        team: Team,
        display_name: &str,
        config: SessionConfig,
    ) -> Self {
        tracing::info!("🎯 Hosting as {} on team {}", local_id, team);

        let mut session = Self::new(
            connection,
            local_id.clone(),
            Role::Host,
            team,
            display_name,
            config,
        );
        session
            .events
            .push(PresentationEvent::ShowConnectionId(local_id));
        session
    }

    /// Dial the host whose identity is `host_id`.
    ///
    /// Fails right away if `host_id` is not a well-formed identifier. The
    /// local team is provisional until the host's welcome assigns one.
    pub fn join(
        connection: C,
        local_id: PeerIdentity,
        host_id: &str,
        display_name: &str,
        config: SessionConfig,
        now: Instant,
    ) -> Result<Self> {
        let gate = ConnectionGate::new(&config);
        let host = gate.admit_outbound(host_id).map_err(|reason| match reason {
            RejectReason::InvalidIdentifier(e) => SessionError::InvalidPeerIdentifier(e),
            other => SessionError::ConnectionRejected(other),
        })?;

        tracing::info!("🎯 Joining host {} as {}", host, local_id);

        let mut session = Self::new(
            connection,
            local_id,
            Role::Client,
            Team::Blue,
            display_name,
            config,
        );
        session.expected_host = Some(host);
        session.clock = now;
        session.session.channel_mut().connect(now);
        Ok(session)
    }

    fn new(
        connection: C,
        local_id: PeerIdentity,
        role: Role,
        team: Team,
        display_name: &str,
        config: SessionConfig,
    ) -> Self {
        let channel = Channel::new(connection, config.connect_timeout());
        let mirror =
            GameStateMirror::new(local_id.clone(), team, display_name, config.rules.clone());

        Self {
            session: Session::new(local_id, role, channel),
            display_name: display_name.to_string(),
            expected_host: None,
            gate: ConnectionGate::new(&config),
            router: EventRouter::new(role),
            scheduler: ReplicationScheduler::new(role, &config),
            mirror,
            outbound: MessageQueue::new(config.outbound_queue_size),
            pending: HashMap::new(),
            power_up_respawn: Countdown::default(),
            clock: Instant::now(),
            events: Vec::new(),
            config,
        }
    }

    // Queries

    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    pub fn local_id(&self) -> &PeerIdentity {
        self.session.local_id()
    }

    pub fn role(&self) -> Role {
        self.session.role()
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn mirror(&self) -> &GameStateMirror {
        &self.mirror
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn pending_outbound(&self) -> usize {
        self.outbound.len()
    }

    /// Inbound messages the router refused
    pub fn dropped_messages(&self) -> u64 {
        self.router.dropped()
    }

    pub fn power_up_respawn_armed(&self) -> bool {
        self.power_up_respawn.is_armed()
    }

    pub fn drain_events(&mut self) -> Vec<PresentationEvent> {
        std::mem::take(&mut self.events)
    }

    // Main loop

    /// Process transport traffic, fire due timers and flush the outbound
    /// queue. Returns how many items were handled.
    pub fn poll(&mut self, now: Instant) -> usize {
        if self.phase() == SessionPhase::Closed {
            return 0;
        }

        self.clock = now;
        let mut processed = 0;

        for event in self.session.channel_mut().poll(now) {
            processed += 1;
            self.handle_channel_event(event, now);
            if self.phase() == SessionPhase::Closed {
                return processed;
            }
        }

        self.expire_pending(now);

        if self.is_connected() {
            let due = self.scheduler.poll(now, &self.mirror);
            for message in due {
                self.enqueue(message);
            }

            if self.power_up_respawn.poll(now) {
                tracing::info!("⏰ Power-up respawn");
                let position = self.mirror.rules().power_up_spawn;
                self.send_powerup_respawn(position);
            }
        }

        processed + self.flush()
    }

    fn handle_channel_event(&mut self, event: ChannelEvent, now: Instant) {
        match event {
            ChannelEvent::PeerConnected(peer) => self.on_peer_connected(peer, now),
            ChannelEvent::Frame { from, frame } => match frame {
                Frame::Hello(request) => self.on_hello(from, request, now),
                Frame::Welcome(welcome) => self.on_welcome(from, welcome, now),
                Frame::Game(message) => self.on_game_message(from, message, now),
            },
            ChannelEvent::Malformed { .. } => {}
            ChannelEvent::PeerLeft(peer) => {
                self.pending.remove(&peer);
            }
            ChannelEvent::Closed(peer) => {
                tracing::warn!("🔴 Connection to {} lost", peer);
                self.teardown(true);
            }
            ChannelEvent::TimedOut => {
                let error = SessionError::ConnectionTimeout(self.config.connect_timeout_ms);
                tracing::error!("❌ {}", error);
                self.events.push(PresentationEvent::ShowError(error.to_string()));
                self.teardown(false);
            }
            ChannelEvent::TransportClosed(reason) => {
                let error = SessionError::TransportClosed(reason);
                tracing::error!("❌ {}", error);
                self.events.push(PresentationEvent::ShowError(error.to_string()));
                self.teardown(true);
            }
        }
    }

    fn on_peer_connected(&mut self, peer: PeerId, now: Instant) {
        match self.role() {
            Role::Host => {
                if self.is_connected() || !self.gate.has_capacity() {
                    tracing::warn!("🚫 Session full, turning away {}", peer);
                    self.session.channel_mut().reject(peer);
                    return;
                }
                tracing::debug!("Awaiting hello from {}", peer);
                self.pending.insert(peer, now + self.config.connect_timeout());
            }
            Role::Client => {
                if self.phase() != SessionPhase::Opening {
                    return;
                }
                let hello = Frame::Hello(ConnectRequest::new(
                    self.local_id(),
                    &self.display_name,
                    wall_clock_millis(),
                ));
                if let Err(e) = self.session.channel_mut().send_frame_to(peer, &hello) {
                    tracing::error!("❌ Failed to send hello to {}: {}", peer, e);
                }
            }
        }
    }

    fn on_hello(&mut self, from: PeerId, request: ConnectRequest, now: Instant) {
        if !self.role().is_host() || self.pending.remove(&from).is_none() {
            tracing::debug!("Ignoring unexpected hello from {}", from);
            return;
        }

        match self.gate.admit(&request, wall_clock_millis()) {
            Ok(remote) => {
                let team = self.mirror.local_player().team.opponent();

                self.gate.activate();
                self.session.channel_mut().open(from);
                self.session.activate(remote.clone());

                let welcome = Frame::Welcome(Welcome {
                    host_id: self.local_id().clone(),
                    team,
                });
                if let Err(e) = self.session.channel_mut().send_frame_to(from, &welcome) {
                    tracing::error!("❌ Failed to welcome {}: {}", remote, e);
                }

                for (peer, _) in self.pending.drain() {
                    self.session.channel_mut().reject(peer);
                }

                self.scheduler.start(now);
                self.events
                    .push(PresentationEvent::Connected { remote, team });
            }
            Err(reason) => {
                tracing::warn!("❌ Rejected {:?}: {}", request.peer_id, reason);
                self.session.channel_mut().reject(from);
                self.events.push(PresentationEvent::ShowError(
                    SessionError::ConnectionRejected(reason).to_string(),
                ));
            }
        }
    }

    fn on_welcome(&mut self, from: PeerId, welcome: Welcome, now: Instant) {
        if self.role().is_host() || self.phase() != SessionPhase::Opening {
            tracing::debug!("Ignoring unexpected welcome from {}", from);
            return;
        }
        if self.expected_host.as_ref() != Some(&welcome.host_id) {
            tracing::warn!("⚠️ Welcome from {} is not the host we dialled", welcome.host_id);
            return;
        }

        self.gate.activate();
        self.session.channel_mut().open(from);
        self.session.activate(welcome.host_id.clone());
        self.mirror.assign_local_team(welcome.team);
        self.scheduler.start(now);

        self.events.push(PresentationEvent::Connected {
            remote: welcome.host_id,
            team: welcome.team,
        });

        let local = self.mirror.local_player();
        let join = WireMessage::Join(JoinPayload {
            id: local.id.clone(),
            team: Some(local.team),
            position: Some(local.position),
            display_name: self.display_name.clone(),
        });
        self.send_message(join);
    }

    fn on_game_message(&mut self, from: PeerId, message: WireMessage, now: Instant) {
        if self.session.channel().peer() != Some(from) {
            tracing::warn!("⚠️ Dropping {} from unbound peer {}", message.tag(), from);
            return;
        }
        let Some(sender) = self.session.remote_id().cloned() else {
            return;
        };

        let collect = matches!(message, WireMessage::PowerupCollect(_));
        let respawn = matches!(message, WireMessage::PowerupRespawn(_));
        let dropped = self.router.dropped();

        if let Some(reply) =
            self.router
                .route_from(&sender, &mut self.mirror, message, &mut self.events)
        {
            self.enqueue(reply);
        }

        if self.router.dropped() != dropped || !self.role().is_host() {
            return;
        }
        if collect {
            self.power_up_respawn.arm(now, self.config.power_up_respawn());
        } else if respawn {
            self.power_up_respawn.cancel();
        }
    }

    /// Host: hang up on peers that connected but never said hello
    fn expire_pending(&mut self, now: Instant) {
        let expired: Vec<PeerId> = self
            .pending
            .iter()
            .filter(|(_, deadline)| now >= **deadline)
            .map(|(peer, _)| *peer)
            .collect();

        for peer in expired {
            tracing::warn!("⏰ No hello from {}", peer);
            self.pending.remove(&peer);
            self.session.channel_mut().reject(peer);
        }
    }

    fn flush(&mut self) -> usize {
        if !self.is_connected() {
            return 0;
        }

        let batch = self.outbound.take_batch(self.config.batch_size);
        let count = batch.len();
        for message in &batch {
            self.session.channel_mut().send(message);
        }
        if count > 0 {
            tracing::trace!("📤 Flushed {} message(s)", count);
        }
        count
    }

    fn teardown(&mut self, lost: bool) {
        self.scheduler.cancel();
        self.power_up_respawn.cancel();
        self.outbound.clear();
        self.pending.clear();

        for id in self.mirror.clear_players() {
            self.events.push(PresentationEvent::PlayerRemoved(id));
        }

        if self.session.phase() == SessionPhase::Active {
            self.gate.release();
        }
        self.session.close();

        if lost {
            self.events.push(PresentationEvent::ConnectionLost);
        }
    }

    /// Close the session. Idempotent.
    pub fn close(&mut self) {
        if self.phase() == SessionPhase::Closed {
            return;
        }
        tracing::info!("🔴 Closing session");
        self.teardown(false);
    }

    // Sender API

    /// Record the presentation layer's local player state. It goes out
    /// through the delta throttle on a later poll.
    pub fn update_local_player(&mut self, fields: PlayerFields) {
        self.mirror.update_local(&fields);
    }

    pub fn send_shoot(&mut self, weapon: Weapon, position: Position, angle: f32, speed: f32) {
        let id = self.local_id().clone();
        self.send_message(WireMessage::Shoot(ShootPayload {
            id,
            weapon,
            position,
            angle,
            speed,
        }));
    }

    pub fn send_bullet_hit(
        &mut self,
        position: Position,
        target: Option<PeerIdentity>,
        damage: Option<i32>,
    ) {
        let payload = self.hit_payload(position, target, damage);
        self.send_message(WireMessage::BulletHit(payload));
    }

    pub fn send_rocket_hit(
        &mut self,
        position: Position,
        target: Option<PeerIdentity>,
        damage: Option<i32>,
    ) {
        let payload = self.hit_payload(position, target, damage);
        self.send_message(WireMessage::RocketHit(payload));
    }

    fn hit_payload(
        &self,
        position: Position,
        target_id: Option<PeerIdentity>,
        damage: Option<i32>,
    ) -> HitPayload {
        HitPayload {
            id: self.local_id().clone(),
            position,
            target_id,
            damage,
        }
    }

    pub fn send_damage(&mut self, target: PeerIdentity, amount: i32) {
        let id = self.local_id().clone();
        self.send_message(WireMessage::Damage(DamagePayload {
            id,
            target_id: target,
            amount,
        }));
    }

    pub fn send_flag_pickup(&mut self, flag: Team) {
        let id = self.local_id().clone();
        self.send_message(WireMessage::FlagPickup(FlagPayload { id, flag }));
    }

    pub fn send_flag_return(&mut self, flag: Team) {
        let id = self.local_id().clone();
        self.send_message(WireMessage::FlagReturn(FlagPayload { id, flag }));
    }

    pub fn send_flag_capture(&mut self, team: Team) {
        let id = self.local_id().clone();
        self.send_message(WireMessage::FlagCapture(CapturePayload { id, team }));
    }

    pub fn send_player_death(&mut self, position: Position, dropped_flag: Option<Team>) {
        let local = self.mirror.local_player();
        let message = WireMessage::PlayerDeath(DeathPayload {
            id: local.id.clone(),
            team: local.team,
            position,
            dropped_flag,
        });
        self.send_message(message);
    }

    pub fn send_player_respawn(&mut self, position: Position) {
        let id = self.local_id().clone();
        self.send_message(WireMessage::PlayerRespawn(RespawnPayload { id, position }));
    }

    /// Collect the power-up. On the host this arms the respawn countdown.
    pub fn send_powerup_collect(&mut self) {
        let id = self.local_id().clone();
        self.send_message(WireMessage::PowerupCollect(PowerupCollectPayload { id }));
        if self.role().is_host() && self.is_connected() {
            self.power_up_respawn
                .arm(self.clock, self.config.power_up_respawn());
        }
    }

    pub fn send_powerup_respawn(&mut self, position: Position) {
        let id = self.local_id().clone();
        self.send_message(WireMessage::PowerupRespawn(PowerupRespawnPayload { id, position }));
        self.power_up_respawn.cancel();
    }

    /// Apply locally, then queue for the peer
    fn send_message(&mut self, message: WireMessage) {
        self.router
            .apply_local(&mut self.mirror, &message, &mut self.events);
        self.enqueue(message);
    }

    fn enqueue(&mut self, message: WireMessage) {
        if !self.is_connected() {
            tracing::warn!("⚠️ Not connected, dropping {}", message.tag());
            return;
        }
        let tag = message.tag();
        if let Err(e) = self.outbound.push(message) {
            tracing::warn!("⚠️ Dropping {}: {}", tag, SessionError::from(e));
        }
    }
}

fn wall_clock_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
