use cucumber::{given, then, when};
use ctf_session_core::protocol::{CapturePayload, DeathPayload, FlagPayload, HitPayload};
use ctf_session_core::{Position, WireMessage};
use ctf_session_p2p::PresentationEvent;
use ctf_session_tests::{peer, team, MatchWorld};

#[given(expr = "peer {string} carries the {string} flag")]
async fn peer_carries_flag(world: &mut MatchWorld, id: String, flag: String) {
    world.receive(WireMessage::FlagPickup(FlagPayload {
        id: peer(&id),
        flag: team(&flag),
    }));
}

#[when(expr = "peer {string} hits me with a bullet for {int} damage")]
async fn peer_hits_me(world: &mut MatchWorld, id: String, damage: i32) {
    let me = world.mirror.local_player();
    let hit = HitPayload {
        id: peer(&id),
        position: me.position,
        target_id: Some(me.id.clone()),
        damage: Some(damage),
    };
    world.receive(WireMessage::BulletHit(hit));
}

#[when(expr = "peer {string} dies at {int}, {int}")]
async fn peer_dies(world: &mut MatchWorld, id: String, x: f32, y: f32) {
    let id = peer(&id);
    let side = world
        .mirror
        .team_of(&id)
        .unwrap_or_else(|| panic!("{} is not a known player", id));
    world.receive(WireMessage::PlayerDeath(DeathPayload {
        id,
        team: side,
        position: Position::new(x, y),
        dropped_flag: None,
    }));
}

#[when(expr = "team {string} captures {int} flag(s)")]
async fn team_captures(world: &mut MatchWorld, name: String, times: u32) {
    let capturer = world
        .mirror
        .players()
        .map(|p| p.id.clone())
        .next()
        .expect("a remote player to capture with");
    for _ in 0..times {
        world.receive(WireMessage::FlagCapture(CapturePayload {
            id: capturer.clone(),
            team: team(&name),
        }));
    }
}

#[then(expr = "my health is {int}")]
async fn my_health(world: &mut MatchWorld, expected: u8) {
    assert_eq!(world.mirror.local_player().health, expected);
}

#[then("the hit was lethal")]
async fn hit_was_lethal(world: &mut MatchWorld) {
    let last = world
        .events
        .iter()
        .rev()
        .find_map(|e| match e {
            PresentationEvent::Damaged { lethal, local, .. } => Some((*lethal, *local)),
            _ => None,
        });
    assert_eq!(last, Some((true, true)));
}
