use clap::{Parser, Subcommand, ValueEnum};
use ctf_session_cli::{CliError, ConsolePresenter, Flow, LogConfig, PatrolPilot, Result};
use ctf_session_core::{Position, Team};
use ctf_session_p2p::{
    GameSession, GameSessionBuilder, IceServer, MatchboxConnection, SessionConfig,
};
use instant::{Duration, Instant};
use tracing::{info, warn};

const DEFAULT_SERVER: &str = "ws://localhost:3536";

#[derive(Parser)]
#[command(name = "ctf-cli")]
#[command(version, about = "Capture-the-flag session CLI - headless P2P host and client")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum TeamArg {
    Red,
    Blue,
}

impl From<TeamArg> for Team {
    fn from(team: TeamArg) -> Self {
        match team {
            TeamArg::Red => Team::Red,
            TeamArg::Blue => Team::Blue,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Host a match and wait for an opponent
    Host {
        /// Matchbox signalling server URL
        #[arg(short = 's', long, env = "CTF_SIGNALLING_SERVER", default_value = DEFAULT_SERVER)]
        server: String,

        /// Display name
        #[arg(short = 'n', long, env = "CTF_PLAYER_NAME", default_value = "Host")]
        name: String,

        /// Team to play for; the opponent gets the other one
        #[arg(short = 't', long, env = "CTF_TEAM", value_enum, default_value = "red")]
        team: TeamArg,

        /// TURN server URL (optional, format: turn:host:port)
        #[arg(long)]
        turn_server: Option<String>,

        /// TURN username (required if turn-server is set)
        #[arg(long)]
        turn_username: Option<String>,

        /// TURN credential (required if turn-server is set)
        #[arg(long)]
        turn_credential: Option<String>,
    },

    /// Join a match hosted by another player
    Join {
        /// Matchbox signalling server URL
        #[arg(short = 's', long, env = "CTF_SIGNALLING_SERVER", default_value = DEFAULT_SERVER)]
        server: String,

        /// Connection id shown by the host
        #[arg(short = 'i', long, env = "CTF_HOST_ID")]
        host_id: String,

        /// Display name
        #[arg(short = 'n', long, env = "CTF_PLAYER_NAME", default_value = "Guest")]
        name: String,

        /// TURN server URL (optional, format: turn:host:port)
        #[arg(long)]
        turn_server: Option<String>,

        /// TURN username (required if turn-server is set)
        #[arg(long)]
        turn_username: Option<String>,

        /// TURN credential (required if turn-server is set)
        #[arg(long)]
        turn_credential: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    LogConfig::from_flags(cli.verbose, cli.json_logs)
        .init()
        .map_err(CliError::Logging)?;

    match cli.command {
        Commands::Host {
            server,
            name,
            team,
            turn_server,
            turn_username,
            turn_credential,
        } => {
            let config = build_config(&server, turn_server, turn_username, turn_credential)?;
            host_match(config, &name, team.into()).await?;
        }
        Commands::Join {
            server,
            host_id,
            name,
            turn_server,
            turn_username,
            turn_credential,
        } => {
            let config = build_config(&server, turn_server, turn_username, turn_credential)?;
            join_match(config, &host_id, &name).await?;
        }
    }

    Ok(())
}

fn build_config(
    server: &str,
    turn_server: Option<String>,
    turn_username: Option<String>,
    turn_credential: Option<String>,
) -> Result<SessionConfig> {
    let config = SessionConfig::new(server);

    let Some(turn_url) = turn_server else {
        return Ok(config);
    };

    match (turn_username, turn_credential) {
        (Some(username), Some(credential)) => {
            info!("Using TURN server: {}", turn_url);
            let mut servers = IceServer::default_stun_servers();
            servers.push(IceServer::turn(turn_url, username, credential));
            Ok(config.with_ice_servers(servers))
        }
        _ => Err(CliError::InvalidConfig(
            "TURN server requires both username and credential".to_string(),
        )),
    }
}

async fn host_match(config: SessionConfig, name: &str, team: Team) -> Result<()> {
    info!("Hosting a match as '{}' on team {}", name, team);
    info!(
        "Connecting to signalling server: {}",
        config.signalling_server
    );

    let join_hint = format!("ctf-cli join --server {}", config.signalling_server);
    let session = GameSessionBuilder::new(config)
        .display_name(name)
        .team(team)
        .build_host()
        .await?;

    info!("✓ Match created");
    info!("Waiting for an opponent...");
    info!("Press Ctrl+C to exit");

    run_event_loop(session, ConsolePresenter::new(Some(join_hint))).await
}

async fn join_match(config: SessionConfig, host_id: &str, name: &str) -> Result<()> {
    info!("Joining match {} as '{}'", host_id, name);
    info!(
        "Connecting to signalling server: {}",
        config.signalling_server
    );

    let session = GameSessionBuilder::new(config)
        .display_name(name)
        .build_client(host_id)
        .await?;

    info!("Waiting for the host to accept...");
    info!("Press Ctrl+C to exit");

    run_event_loop(session, ConsolePresenter::new(None)).await
}

/// Patrol from the local spawn toward the middle of the arena
fn pilot_for(session: &GameSession<MatchboxConnection>) -> PatrolPilot {
    let rules = session.mirror().rules();
    let spawn = session.mirror().local_player().position;
    let centre = Position::new(rules.arena_width / 2.0, spawn.y);
    PatrolPilot::new(spawn, centre, 120.0, Duration::from_millis(750))
}

async fn run_event_loop(
    mut session: GameSession<MatchboxConnection>,
    mut presenter: ConsolePresenter,
) -> Result<()> {
    let frame = session.config().poll_interval();
    let mut interval = tokio::time::interval(frame);
    let mut pilot: Option<PatrolPilot> = None;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if session.is_connected() {
                    let pilot = pilot.get_or_insert_with(|| pilot_for(&session));
                    let (fields, shot) = pilot.step(frame);
                    session.update_local_player(fields);
                    if let Some(shot) = shot {
                        session.send_shoot(shot.weapon, shot.position, shot.angle, shot.speed);
                    }
                }

                session.poll(Instant::now());

                let mut stop = false;
                for event in session.drain_events() {
                    if presenter.present(&event) == Flow::Stop {
                        stop = true;
                    }
                }
                if stop {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("");
                info!("Shutting down...");
                break;
            }
        }
    }

    session.close();
    if session.dropped_messages() > 0 {
        warn!("{} inbound messages were dropped", session.dropped_messages());
    }
    info!("Final scoreboard: {}", serde_json::to_string(&presenter.summary())?);

    Ok(())
}
