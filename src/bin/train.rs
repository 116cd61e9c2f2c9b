#![recursion_limit = "256"]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use ml_minesweeper::ai::algorithms::DqnAgent;
use ml_minesweeper::ai::{RandomAgent, TrainableAgent};
use ml_minesweeper::checkpoint::CheckpointManager;
use ml_minesweeper::config::AppConfig;
use ml_minesweeper::render::{NullRenderer, Renderer, TextRenderer};
use ml_minesweeper::training::{evaluate, LogTelemetry, Trainer};

/// Train a DQN agent to play Minesweeper.
#[derive(Parser)]
#[command(name = "train", about = "Train a Minesweeper DQN agent")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override number of training episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// Override learning rate
    #[arg(long)]
    lr: Option<f64>,

    /// Override board size (n for an n x n board)
    #[arg(long)]
    size: Option<usize>,

    /// Override mine count
    #[arg(long)]
    mines: Option<usize>,

    /// Seed board placement and exploration
    #[arg(long)]
    seed: Option<u64>,

    /// Resume training from the latest checkpoint
    #[arg(long)]
    resume: bool,

    /// Print every board frame to stdout
    #[arg(long)]
    render: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(episodes) = cli.episodes {
        config.training.num_episodes = episodes;
    }
    if let Some(lr) = cli.lr {
        config.dqn.learning_rate = lr;
    }
    if let Some(size) = cli.size {
        config.board.size = size;
    }
    if let Some(mines) = cli.mines {
        config.board.mines = mines;
    }
    if let Some(seed) = cli.seed {
        config.board.seed = Some(seed);
        config.dqn.seed = Some(seed);
    }
    config.validate().context("invalid configuration")?;

    if cli.print_config {
        print!(
            "{}",
            toml::to_string_pretty(&config).context("serializing configuration")?
        );
        return Ok(());
    }

    let cells = config.board.cells();
    let mut agent = DqnAgent::new(config.dqn.clone(), cells);
    let manager = CheckpointManager::new(config.checkpoint.clone());

    let mut best_score = 0;
    if cli.resume {
        match manager.load_checkpoint("latest") {
            Ok(data) => {
                if data.metadata.board_cells != cells {
                    bail!(
                        "checkpoint {} was trained on {} cells, board has {}",
                        data.path.display(),
                        data.metadata.board_cells,
                        cells
                    );
                }
                manager
                    .restore_into(&mut agent, &data)
                    .with_context(|| format!("restoring {}", data.path.display()))?;
                best_score = data.metadata.metrics.best_score;
                log::info!(
                    "Resumed from episode {} (best score {})",
                    data.metadata.episode,
                    best_score
                );
            }
            Err(e) => log::warn!("No checkpoint found ({}), starting fresh", e),
        }
    }

    let trainer = Trainer::new(
        config.training.clone(),
        config.board.clone(),
        config.rewards.clone(),
    )
    .with_checkpoints(manager)
    .with_best_score(best_score);

    let end_episode = agent.episode_count() + config.training.num_episodes;
    let mut telemetry = LogTelemetry::new(config.training.log_interval, end_episode);
    let mut renderer: Box<dyn Renderer> = if cli.render {
        Box::new(TextRenderer::stdout())
    } else {
        Box::new(NullRenderer)
    };

    let summary = trainer
        .train(&mut agent, renderer.as_mut(), &mut telemetry)
        .context("training failed")?;
    log::info!(
        "Trained {} episodes, best score {}",
        summary.episodes,
        summary.best_score
    );

    let final_eval = trainer.evaluate(&mut agent)?;
    let baseline = evaluate(
        &mut RandomAgent::new(),
        &config.board,
        &config.rewards,
        config.training.eval_games,
        config.training.eval_seed,
    )?;
    log::info!(
        "Final eval: {} {:.1}% win rate (mean score {:.1}) | Random {:.1}% (mean score {:.1})",
        agent.algorithm_name(),
        final_eval.win_rate * 100.0,
        final_eval.mean_score,
        baseline.win_rate * 100.0,
        baseline.mean_score
    );

    Ok(())
}
