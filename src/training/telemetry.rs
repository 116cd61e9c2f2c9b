//! Per-episode metric sinks. Telemetry only observes; nothing it does feeds
//! back into training.

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use crate::training::episode::EvalSummary;

/// Metrics emitted once per completed episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeReport {
    /// Lifetime episode number (continues across resumes).
    pub episode: usize,
    pub score: usize,
    pub best_score: usize,
    pub won: bool,
    pub total_reward: f32,
    pub steps: usize,
    pub win_rate: f32,
    pub mean_score: f32,
    pub average_reward: f32,
    pub average_loss: f32,
    pub epsilon: f32,
}

/// Updates forwarded to an external plotter.
#[derive(Debug, Clone)]
pub enum TrainingUpdate {
    Episode(EpisodeReport),
    Eval { episode: usize, summary: EvalSummary },
    CheckpointSaved { episode: usize, path: PathBuf },
    Finished,
}

pub trait Telemetry {
    fn record_episode(&mut self, report: &EpisodeReport);

    fn record_eval(&mut self, _episode: usize, _summary: &EvalSummary) {}

    fn checkpoint_saved(&mut self, _episode: usize, _path: &Path) {}

    fn finished(&mut self) {}
}

/// Writes progress through the `log` facade every `log_interval` episodes.
pub struct LogTelemetry {
    log_interval: usize,
    end_episode: usize,
}

impl LogTelemetry {
    pub fn new(log_interval: usize, end_episode: usize) -> Self {
        LogTelemetry {
            log_interval: log_interval.max(1),
            end_episode,
        }
    }
}

impl Telemetry for LogTelemetry {
    fn record_episode(&mut self, r: &EpisodeReport) {
        log::debug!(
            "episode {} score {} reward {:.1} won {}",
            r.episode,
            r.score,
            r.total_reward,
            r.won
        );
        if r.episode % self.log_interval == 0 {
            log::info!(
                "Episode {}/{} | eps: {:.3} | loss: {:.4} | score: {:.1} | best: {} | win: {:.1}% | reward: {:.1}",
                r.episode,
                self.end_episode,
                r.epsilon,
                r.average_loss,
                r.mean_score,
                r.best_score,
                r.win_rate * 100.0,
                r.average_reward,
            );
        }
    }

    fn record_eval(&mut self, episode: usize, summary: &EvalSummary) {
        log::info!(
            "  >> Eval at episode {} ({} games): {:.1}% win rate, mean score {:.1}",
            episode,
            summary.games,
            summary.win_rate * 100.0,
            summary.mean_score
        );
    }

    fn checkpoint_saved(&mut self, episode: usize, path: &Path) {
        log::info!("  >> Checkpoint saved at episode {}: {}", episode, path.display());
    }

    fn finished(&mut self) {
        log::info!("Training complete.");
    }
}

/// Forwards every update over a channel. A dropped receiver is ignored.
pub struct ChannelTelemetry {
    tx: mpsc::Sender<TrainingUpdate>,
}

impl ChannelTelemetry {
    pub fn new(tx: mpsc::Sender<TrainingUpdate>) -> Self {
        ChannelTelemetry { tx }
    }
}

impl Telemetry for ChannelTelemetry {
    fn record_episode(&mut self, report: &EpisodeReport) {
        let _ = self.tx.send(TrainingUpdate::Episode(report.clone()));
    }

    fn record_eval(&mut self, episode: usize, summary: &EvalSummary) {
        let _ = self.tx.send(TrainingUpdate::Eval {
            episode,
            summary: *summary,
        });
    }

    fn checkpoint_saved(&mut self, episode: usize, path: &Path) {
        let _ = self.tx.send(TrainingUpdate::CheckpointSaved {
            episode,
            path: path.to_path_buf(),
        });
    }

    fn finished(&mut self) {
        let _ = self.tx.send(TrainingUpdate::Finished);
    }
}

pub struct NullTelemetry;

impl Telemetry for NullTelemetry {
    fn record_episode(&mut self, _report: &EpisodeReport) {}
}
