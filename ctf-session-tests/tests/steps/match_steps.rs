use cucumber::{given, then};
use ctf_session_core::{MatchRules, Position};
use ctf_session_p2p::{PresentationEvent, Role};
use ctf_session_tests::{peer, team, MatchWorld};

// ===== Given Steps =====

#[given(expr = "I am hosting on team {string}")]
async fn hosting_on_team(world: &mut MatchWorld, name: String) {
    world.reset(Role::Host, team(&name), MatchRules::default());
}

#[given(expr = "I am hosting on team {string} with {int} captures to win")]
async fn hosting_with_winning_captures(world: &mut MatchWorld, name: String, captures: u32) {
    let rules = MatchRules::default().with_winning_captures(captures);
    world.reset(Role::Host, team(&name), rules);
}

#[given(expr = "I am a client on team {string}")]
async fn client_on_team(world: &mut MatchWorld, name: String) {
    world.reset(Role::Client, team(&name), MatchRules::default());
}

// ===== Then Steps =====

#[then(expr = "peer {string} plays for team {string}")]
async fn peer_plays_for(world: &mut MatchWorld, id: String, name: String) {
    let player = world
        .mirror
        .player(&peer(&id))
        .unwrap_or_else(|| panic!("{} is not a known player", id));
    assert_eq!(player.team, team(&name));
}

#[then(expr = "there is/are {int} remote player(s)")]
async fn remote_player_count(world: &mut MatchWorld, expected: usize) {
    assert_eq!(world.mirror.player_count(), expected);
}

#[then(expr = "team {string} has {int} capture(s)")]
async fn team_captures(world: &mut MatchWorld, name: String, expected: u32) {
    assert_eq!(world.mirror.scores().get(team(&name)).captures, expected);
}

#[then(expr = "team {string} has {int} kill(s)")]
async fn team_kills(world: &mut MatchWorld, name: String, expected: u32) {
    assert_eq!(world.mirror.scores().get(team(&name)).kills, expected);
}

#[then(expr = "team {string} was declared winner once")]
async fn declared_winner_once(world: &mut MatchWorld, name: String) {
    let winner = team(&name);
    let announcements = world.count(|e| matches!(e, PresentationEvent::MatchWon(t) if *t == winner));
    assert_eq!(announcements, 1);
    assert_eq!(world.mirror.winner(), Some(winner));
}

#[then(expr = "the {string} flag lies at {int}, {int}")]
async fn flag_lies_at(world: &mut MatchWorld, name: String, x: f32, y: f32) {
    let flag = world.mirror.flags().get(team(&name));
    assert!(!flag.at_base);
    assert!(flag.carrier.is_none());
    assert_eq!(flag.position, Position::new(x, y));
}

#[then(expr = "the {string} flag is at its base")]
async fn flag_at_base(world: &mut MatchWorld, name: String) {
    let side = team(&name);
    let flag = world.mirror.flags().get(side);
    assert!(flag.at_base);
    assert!(flag.carrier.is_none());
    assert_eq!(flag.position, world.mirror.rules().spawn_point(side));
}

#[then("I send no reply")]
async fn no_reply(world: &mut MatchWorld) {
    assert!(world.replies.is_empty(), "unexpected replies: {:?}", world.replies);
}

#[then(expr = "{int} inbound message(s) was/were dropped")]
async fn dropped_messages(world: &mut MatchWorld, expected: u64) {
    assert_eq!(world.router.dropped(), expected);
}
