use cucumber::gherkin::Step;
use cucumber::{given, then, when};
use ctf_session_core::protocol::{JoinPayload, StatePayload};
use ctf_session_core::{
    GameStateMirror, PlayerFields, Position, ScoreDelta, Team, WireMessage,
};
use ctf_session_tests::{peer, team, MatchWorld};

// ===== Given Steps =====

#[given(expr = "peer {string} has joined")]
async fn peer_has_joined(world: &mut MatchWorld, id: String) {
    world.receive(WireMessage::Join(JoinPayload {
        id: peer(&id),
        team: None,
        position: None,
        display_name: "Guest".to_string(),
    }));
    world.replies.clear();
    world.events.clear();
}

// ===== When Steps =====

#[when(expr = "peer {string} joins asking for team {string}")]
async fn peer_joins(world: &mut MatchWorld, id: String, name: String) {
    world.receive(WireMessage::Join(JoinPayload {
        id: peer(&id),
        team: Some(team(&name)),
        position: None,
        display_name: "Guest".to_string(),
    }));
}

#[when(expr = "peer {string} reports position {int}, {int}")]
async fn peer_reports_position(world: &mut MatchWorld, id: String, x: f32, y: f32) {
    world.receive(WireMessage::State(StatePayload {
        id: peer(&id),
        fields: PlayerFields::default().position(Position::new(x, y)),
    }));
}

#[when("the wire delivers:")]
async fn wire_delivers(world: &mut MatchWorld, step: &Step) {
    let json = step.docstring.as_deref().expect("step needs a docstring");
    let message = WireMessage::decode(json.trim().as_bytes()).expect("docstring must decode");
    world.receive(message);
}

#[when(expr = "host {string} sends a snapshot with red on {int} captures")]
async fn host_sends_snapshot(world: &mut MatchWorld, id: String, captures: u32) {
    let mut host = GameStateMirror::new(
        peer(&id),
        Team::Red,
        "Host",
        world.mirror.rules().clone(),
    );
    host.update_local(&PlayerFields::default().position(Position::new(100.0, 408.0)));
    for _ in 0..captures {
        host.apply_score_delta(ScoreDelta::capture(Team::Red));
    }

    world.receive(WireMessage::GameStateSnapshot(host.snapshot()));
}

// ===== Then Steps =====

#[then("I reply with a game state snapshot")]
async fn replies_with_snapshot(world: &mut MatchWorld) {
    match world.replies.as_slice() {
        [WireMessage::GameStateSnapshot(snapshot)] => {
            let ids: Vec<_> = snapshot.players.iter().map(|p| p.id.clone()).collect();
            assert!(
                world.mirror.players().all(|p| ids.contains(&p.id)),
                "snapshot should list every known player"
            );
        }
        other => panic!("expected one snapshot reply, got {:?}", other),
    }
}
