use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use qsnake::game::GameConfig;
use qsnake::logging;
use qsnake::modes::{HUMAN_TICK_MS, HumanMode, ReplayMode, RunMode, TrainConfig, TrainMode};
use qsnake::rl::q_table_file;

/// Tick for watching a trained table play
const RUN_TICK_MS: u64 = 1;

/// Tick for replaying a recorded path
const REPLAY_TICK_MS: u64 = 50;

#[derive(Parser)]
#[command(name = "qsnake")]
#[command(version, about = "Snake with a tabular Q-learning agent")]
struct Cli {
    #[arg(long, value_enum, default_value = "train")]
    mode: Mode,

    /// Side length of the square grid [default: 20, or 30 for human play]
    #[arg(long)]
    grid_size: Option<usize>,

    /// Training episodes; also picks the default table for run mode
    #[arg(long, default_value = "2500")]
    episodes: usize,

    /// Trained table to load in run mode
    #[arg(long)]
    q_table: Option<PathBuf>,

    /// Recorded best path to play back in replay mode
    #[arg(long)]
    path: Option<PathBuf>,

    /// Root directory for trained tables and best paths
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Milliseconds between game ticks in the interactive modes
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Seed for reproducible training
    #[arg(long)]
    seed: Option<u64>,

    /// Log filter, overridden by RUST_LOG [default: info for train, warn otherwise]
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Learn a Q-table headlessly and save it with the best path
    Train,
    /// Watch a trained table play greedily
    Run,
    /// Play back a recorded best path
    Replay,
    /// Play snake with keyboard controls
    Human,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.mode {
        Mode::Train => logging::HEADLESS_LEVEL,
        _ => logging::INTERACTIVE_LEVEL,
    };
    logging::init(cli.log_level.as_deref().unwrap_or(default_level))?;

    let config = match (cli.grid_size, cli.mode) {
        (Some(size), _) => GameConfig::new(size),
        (None, Mode::Human) => GameConfig::human(),
        (None, _) => GameConfig::training(),
    };
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid game config: {e}"))?;

    match cli.mode {
        Mode::Train => train(cli, config).await?,
        Mode::Run => {
            let table = cli
                .q_table
                .unwrap_or_else(|| q_table_file(&cli.out_dir, cli.episodes));
            let tick_ms = cli.tick_ms.unwrap_or(RUN_TICK_MS);
            let mut run_mode = RunMode::new(&table, config, cli.out_dir, tick_ms)?;
            run_mode.run().await?;
        }
        Mode::Replay => {
            let Some(path) = cli.path else {
                bail!("replay mode needs --path <file>");
            };
            let tick_ms = cli.tick_ms.unwrap_or(REPLAY_TICK_MS);
            let mut replay_mode = ReplayMode::new(&path, config, tick_ms)?;
            replay_mode.run().await?;
        }
        Mode::Human => {
            let mut human_mode = HumanMode::new(config, cli.tick_ms.unwrap_or(HUMAN_TICK_MS));
            human_mode.run().await?;
        }
    }

    Ok(())
}

/// Train on a blocking thread; Ctrl+C stops early and still saves
async fn train(cli: Cli, game_config: GameConfig) -> Result<()> {
    if cli.tick_ms.is_some() {
        warn!("--tick-ms has no effect on headless training");
    }

    let mut config = TrainConfig::new(cli.out_dir);
    config.game_config = game_config;
    config.q_config.max_episodes = cli.episodes;
    config.seed = cli.seed;

    let stop = Arc::new(AtomicBool::new(false));
    let signal_stop = Arc::clone(&stop);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("stop requested, finishing up");
            signal_stop.store(true, Ordering::Relaxed);
        }
    });

    let summary = tokio::task::spawn_blocking(move || {
        let mut train_mode = TrainMode::new(config)?;
        train_mode.run(&stop)
    })
    .await
    .context("Training thread panicked")??;

    info!(
        episodes = summary.episodes,
        best_score = summary.best_score,
        "training finished"
    );
    Ok(())
}
