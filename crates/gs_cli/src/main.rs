//! Gridiron CLI
//!
//! Runs exhibition games from a JSON or YAML request file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gs_core::api::{simulate_game, GameRequest, GameResponse, SCHEMA_VERSION};
use gs_core::engine::{simulate_many, SimJob};
use gs_core::models::{GameEvent, Side};
use gs_core::playback::{
    CancellationToken, FnSink, PacingPolicy, PlaybackConfig, PlaybackMessage, PlaybackOutcome,
    PlaybackSession, ThreadSleep,
};

#[derive(Parser)]
#[command(name = "gridiron")]
#[command(about = "Simulate and replay gridiron games", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one game and write the response JSON
    Simulate {
        /// Request file (.json, .yaml or .yml)
        #[arg(long)]
        request: PathBuf,

        /// Output path (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long, default_value = "false")]
        pretty: bool,
    },

    /// Simulate one game and replay it on a real timer
    Replay {
        #[arg(long)]
        request: PathBuf,

        /// Events per batch
        #[arg(long, default_value = "1")]
        batch_size: usize,

        /// Game seconds per real second
        #[arg(long, conflicts_with = "fixed_ms")]
        speed: Option<f64>,

        /// Fixed delay between batches, in milliseconds
        #[arg(long)]
        fixed_ms: Option<u64>,
    },

    /// Simulate many games in parallel with consecutive seeds
    Batch {
        #[arg(long)]
        request: PathBuf,

        /// Number of games
        #[arg(long, default_value = "100")]
        games: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate { request, out, pretty } => run_simulate(&request, out.as_deref(), pretty),
        Commands::Replay { request, batch_size, speed, fixed_ms } => {
            let pacing = match (speed, fixed_ms) {
                (_, Some(delay_ms)) => PacingPolicy::Fixed { delay_ms },
                (Some(speed), None) => {
                    PacingPolicy::GameClock { speed, min_delay_ms: 0, max_delay_ms: 10_000 }
                }
                (None, None) => PacingPolicy::default(),
            };
            run_replay(&request, PlaybackConfig { pacing, batch_size })
        }
        Commands::Batch { request, games } => run_batch(&request, games),
    }
}

fn load_request(path: &Path) -> Result<GameRequest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );
    let request: GameRequest = if is_yaml {
        serde_yaml::from_str(&text).with_context(|| format!("Invalid YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))?
    };

    if request.schema_version != SCHEMA_VERSION {
        bail!("Unsupported schema version: {}", request.schema_version);
    }
    Ok(request)
}

fn run_simulate(path: &Path, out: Option<&Path>, pretty: bool) -> Result<()> {
    let request = load_request(path)?;
    let include_events = request.config.do_play_by_play;
    let record = simulate_game(request)?;
    let response = GameResponse::from_record(record, include_events);

    let json = if pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };

    match out {
        Some(out) => {
            std::fs::write(out, json).with_context(|| format!("Failed to write {}", out.display()))?;
            info!("Response written to {}", out.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_replay(path: &Path, config: PlaybackConfig) -> Result<()> {
    let request = load_request(path)?;
    let names = [request.home.abbrev.clone(), request.away.abbrev.clone()];
    let record = Arc::new(simulate_game(request)?);

    let mut session = PlaybackSession::new(record, config, CancellationToken::new())?;
    let mut sink = FnSink(|message: PlaybackMessage| match message {
        PlaybackMessage::Batch { events, score, .. } => {
            for event in &events {
                println!("{}", format_event(event));
            }
            println!("    {} {} - {} {}", names[0], score[0], score[1], names[1]);
        }
        PlaybackMessage::Completed(box_score) => {
            let tie = if box_score.is_tie() { " (tie)" } else { "" };
            println!(
                "FINAL: {} {} - {} {}{}",
                names[0], box_score.final_score[0], box_score.final_score[1], names[1], tie
            );
        }
    });

    match session.run(&mut sink, &mut ThreadSleep)? {
        PlaybackOutcome::Completed { batches, events } => {
            info!("Replayed {} events in {} batches", events, batches);
        }
        PlaybackOutcome::Cancelled { stopped_at } => {
            info!("Replay cancelled at event {}", stopped_at);
        }
    }
    Ok(())
}

fn format_event(event: &GameEvent) -> String {
    let clock = format!("{}:{:02}", event.clock_secs / 60, event.clock_secs % 60);
    let text = event
        .description
        .clone()
        .unwrap_or_else(|| format!("{:?} ({:?})", event.kind, event.side));
    format!("[{} {:>5}] {}", event.period, clock, text)
}

fn run_batch(path: &Path, games: u64) -> Result<()> {
    let request = load_request(path)?;
    let jobs: Vec<SimJob> = (0..games)
        .map(|i| SimJob {
            home: request.home.clone(),
            away: request.away.clone(),
            config: request.config.clone(),
            seed: request.seed.wrapping_add(i),
        })
        .collect();

    info!("Simulating {} games from seed {}", games, request.seed);
    let mut wins = [0u64; 2];
    let mut ties = 0u64;
    let mut failed = 0u64;
    let mut points = [0u64; 2];

    for (i, result) in simulate_many(jobs).into_iter().enumerate() {
        // A bad request fails every game; an internal error only loses that seed.
        let output = match result {
            Ok(output) => output,
            Err(e) if e.is_internal_error() => {
                error!("Game {} (seed {}) failed: {}", i, request.seed.wrapping_add(i as u64), e);
                failed += 1;
                continue;
            }
            Err(e) => return Err(e).context("Invalid request"),
        };
        let [home, away] = output.tally;
        points[0] += home as u64;
        points[1] += away as u64;
        match home.cmp(&away) {
            std::cmp::Ordering::Greater => wins[Side::Home.index()] += 1,
            std::cmp::Ordering::Less => wins[Side::Away.index()] += 1,
            std::cmp::Ordering::Equal => ties += 1,
        }
    }

    let per_game = |total: u64| if games > 0 { total as f64 / games as f64 } else { 0.0 };
    println!("Games:  {}", games);
    println!(
        "{:<6}  wins {:>5}  avg pts {:>5.1}",
        request.home.abbrev,
        wins[0],
        per_game(points[0])
    );
    println!(
        "{:<6}  wins {:>5}  avg pts {:>5.1}",
        request.away.abbrev,
        wins[1],
        per_game(points[1])
    );
    println!("Ties:   {}", ties);
    if failed > 0 {
        bail!("{} of {} games failed", failed, games);
    }
    Ok(())
}
