use cucumber::{given, then, when};
use ctf_session_p2p::infrastructure::{ConnectRequest, PROTOCOL_VERSION};
use ctf_session_p2p::RejectReason;
use ctf_session_tests::{MatchWorld, NOW_MS};

fn request(peer_id: &str, version: u32, age_ms: i64) -> ConnectRequest {
    ConnectRequest {
        peer_id: peer_id.to_string(),
        version,
        timestamp: NOW_MS - age_ms,
        display_name: "Guest".to_string(),
    }
}

#[given("a peer has been admitted")]
async fn peer_admitted(world: &mut MatchWorld) {
    world
        .gate
        .admit(&request("1700000000001-guest", PROTOCOL_VERSION, 0), NOW_MS)
        .expect("first peer should be admitted");
    world.gate.activate();
}

#[given("that peer has left")]
async fn peer_left(world: &mut MatchWorld) {
    world.gate.release();
}

#[when(expr = "{string} asks to connect with version {int} sent {int} ms ago")]
async fn asks_to_connect(world: &mut MatchWorld, peer_id: String, version: u32, age_ms: i64) {
    let decision = world.gate.admit(&request(&peer_id, version, age_ms), NOW_MS);
    world.last_admission = Some(decision);
}

#[then(expr = "the request is rejected as {string}")]
async fn rejected_as(world: &mut MatchWorld, expected: String) {
    let reason = match world.last_admission.take() {
        Some(Err(reason)) => reason,
        other => panic!("expected a rejection, got {:?}", other),
    };
    let kind = match reason {
        RejectReason::AtCapacity { .. } => "capacity",
        RejectReason::InvalidIdentifier(_) => "malformed",
        RejectReason::VersionMismatch { .. } => "version",
        RejectReason::StaleRequest { .. } => "stale",
    };
    assert_eq!(kind, expected);
}

#[then(expr = "{string} is admitted")]
async fn is_admitted(world: &mut MatchWorld, peer_id: String) {
    match world.last_admission.take() {
        Some(Ok(id)) => assert_eq!(id.as_str(), peer_id),
        other => panic!("expected {} to be admitted, got {:?}", peer_id, other),
    }
}
