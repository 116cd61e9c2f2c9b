use crate::ai::{encode_observation, TrainableAgent, Transition, UpdateMetrics};
use crate::checkpoint::{CheckpointManager, CheckpointMetrics};
use crate::config::BoardConfig;
use crate::error::TrainingError;
use crate::game::RevealOutcome;
use crate::render::Renderer;
use crate::training::episode::{apply_action, evaluate, EvalSummary, RewardConfig};
use crate::training::metrics::{EpisodeResult, TrainingMetrics};
use crate::training::telemetry::{EpisodeReport, Telemetry};

/// Trainer configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub num_episodes: usize,
    pub log_interval: usize,
    pub eval_interval: usize,
    pub eval_games: usize,
    /// Base seed for the evaluation boards, so evaluations are comparable.
    pub eval_seed: u64,
    pub checkpoint_interval: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            num_episodes: 10_000,
            log_interval: 100,
            eval_interval: 500,
            eval_games: 100,
            eval_seed: 42,
            checkpoint_interval: 1000,
        }
    }
}

/// Outcome of a [`Trainer::train`] run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub episodes: usize,
    pub best_score: usize,
    pub last_eval: Option<EvalSummary>,
}

/// Drives episodes on one board: act, learn from every step, then restart,
/// run the long update and report when the game ends.
pub struct Trainer {
    config: TrainerConfig,
    board_config: BoardConfig,
    rewards: RewardConfig,
    checkpoint_manager: Option<CheckpointManager>,
    best_score: usize,
}

impl Trainer {
    pub fn new(config: TrainerConfig, board_config: BoardConfig, rewards: RewardConfig) -> Self {
        Trainer {
            config,
            board_config,
            rewards,
            checkpoint_manager: None,
            best_score: 0,
        }
    }

    /// Save `best` and `latest` checkpoints through `manager`.
    pub fn with_checkpoints(mut self, manager: CheckpointManager) -> Self {
        self.checkpoint_manager = Some(manager);
        self
    }

    /// Record to beat before a new `best` checkpoint is written.
    pub fn with_best_score(mut self, best_score: usize) -> Self {
        self.best_score = best_score;
        self
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Run the full training loop.
    pub fn train<A: TrainableAgent>(
        &self,
        agent: &mut A,
        renderer: &mut dyn Renderer,
        telemetry: &mut dyn Telemetry,
    ) -> Result<TrainingSummary, TrainingError> {
        let mut board = self.board_config.build()?;
        let mut metrics = TrainingMetrics::with_capacity(self.config.log_interval.max(1));
        metrics.set_best_score(self.best_score);
        let mut last_eval = None;
        let mut saved_latest_at = None;

        let start_episode = agent.episode_count() + 1;
        let end_episode = agent.episode_count() + self.config.num_episodes;

        log::info!(
            "Starting {} training on {}x{} board with {} mines for {} episodes (episodes {}..{})",
            agent.algorithm_name(),
            self.board_config.size,
            self.board_config.size,
            self.board_config.mines,
            self.config.num_episodes,
            start_episode,
            end_episode
        );

        for episode in start_episode..=end_episode {
            let mut total_reward = 0.0;
            let mut steps = 0;

            let result = loop {
                let observation = encode_observation(&board);
                let action = agent.select_action(&board, true);
                let step = apply_action(&mut board, action, &self.rewards)?;
                if step.outcome != RevealOutcome::NoChange {
                    renderer.render(&board);
                }
                total_reward += step.reward;
                steps += 1;

                let update = agent.observe(Transition {
                    observation,
                    action,
                    reward: step.reward,
                    next_observation: encode_observation(&board),
                    terminal: step.terminal,
                });
                record_update(&mut metrics, &update);

                if step.terminal {
                    break EpisodeResult {
                        won: step.outcome == RevealOutcome::Won,
                        score: step.score,
                        total_reward,
                        steps,
                    };
                }
            };

            board.restart();
            let update = agent.finish_episode();
            record_update(&mut metrics, &update);

            let window = self.config.log_interval.max(1);
            let new_record = metrics.record_episode(result);
            telemetry.record_episode(&EpisodeReport {
                episode,
                score: result.score,
                best_score: metrics.best_score(),
                won: result.won,
                total_reward: result.total_reward,
                steps: result.steps,
                win_rate: metrics.win_rate(window),
                mean_score: metrics.mean_score(window),
                average_reward: metrics.average_reward(window),
                average_loss: metrics.average_loss(window),
                epsilon: agent.exploration_rate(),
            });

            if new_record {
                log::debug!("new best score {} at episode {}", result.score, episode);
                if self.saves_best() {
                    self.save(agent, &metrics, &result, last_eval, episode, "best", telemetry);
                }
            }

            if episode % self.config.eval_interval.max(1) == 0 {
                let summary = self.evaluate(agent)?;
                telemetry.record_eval(episode, &summary);
                last_eval = Some(summary);
            }

            if episode % self.config.checkpoint_interval.max(1) == 0
                && self.save(agent, &metrics, &result, last_eval, episode, "latest", telemetry)
            {
                saved_latest_at = Some(episode);
            }
        }

        if let Some(manager) = &self.checkpoint_manager {
            if self.config.num_episodes > 0 && saved_latest_at != Some(end_episode) {
                let ckpt_metrics = self.checkpoint_metrics(agent, &metrics, None, last_eval);
                let path = manager.save_checkpoint(agent, &ckpt_metrics, end_episode, "latest")?;
                telemetry.checkpoint_saved(end_episode, &path);
            }
        }
        telemetry.finished();

        Ok(TrainingSummary {
            episodes: self.config.num_episodes,
            best_score: metrics.best_score(),
            last_eval,
        })
    }

    /// Greedy evaluation on the fixed evaluation boards.
    pub fn evaluate<A: TrainableAgent>(&self, agent: &mut A) -> Result<EvalSummary, TrainingError> {
        let eval_state = agent.enter_eval_mode();
        let summary = evaluate(
            agent,
            &self.board_config,
            &self.rewards,
            self.config.eval_games,
            self.config.eval_seed,
        );
        agent.exit_eval_mode(eval_state);
        Ok(summary?)
    }

    fn saves_best(&self) -> bool {
        self.checkpoint_manager
            .as_ref()
            .is_some_and(|m| m.config().save_best)
    }

    fn checkpoint_metrics<A: TrainableAgent>(
        &self,
        agent: &A,
        metrics: &TrainingMetrics,
        result: Option<&EpisodeResult>,
        last_eval: Option<EvalSummary>,
    ) -> CheckpointMetrics {
        let window = self.config.log_interval.max(1);
        CheckpointMetrics {
            score: result.map_or(0, |r| r.score),
            best_score: metrics.best_score(),
            win_rate: last_eval.map_or(metrics.win_rate(window), |e| e.win_rate),
            mean_score: last_eval.map_or(metrics.mean_score(window), |e| e.mean_score),
            current_loss: metrics.average_loss(window),
            training_steps: agent.step_count(),
        }
    }

    /// Write a periodic checkpoint. Failures are logged, not fatal.
    #[allow(clippy::too_many_arguments)]
    fn save<A: TrainableAgent>(
        &self,
        agent: &A,
        metrics: &TrainingMetrics,
        result: &EpisodeResult,
        last_eval: Option<EvalSummary>,
        episode: usize,
        name: &str,
        telemetry: &mut dyn Telemetry,
    ) -> bool {
        let Some(manager) = &self.checkpoint_manager else {
            return false;
        };
        let ckpt_metrics = self.checkpoint_metrics(agent, metrics, Some(result), last_eval);
        match manager.save_checkpoint(agent, &ckpt_metrics, episode, name) {
            Ok(path) => {
                telemetry.checkpoint_saved(episode, &path);
                true
            }
            Err(e) => {
                log::warn!("checkpoint '{}' failed at episode {}: {}", name, episode, e);
                false
            }
        }
    }
}

fn record_update(metrics: &mut TrainingMetrics, update: &UpdateMetrics) {
    if update.batch_size > 0 {
        metrics.record_update(update.loss);
    }
}
