use std::path::Path;

use crate::checkpoint::{CheckpointMetadata, CheckpointMetrics};
use crate::game::Board;

/// One recorded step of play. Observations are the encoded board before and
/// after the action.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub observation: Vec<f32>,
    pub action: usize,
    pub reward: f32,
    pub next_observation: Vec<f32>,
    pub terminal: bool,
}

/// Metrics returned from a training update.
#[derive(Debug, Clone, Default)]
pub struct UpdateMetrics {
    pub loss: f32,
    pub batch_size: usize,
}

/// Universal interface for all agents.
pub trait Agent {
    /// Select an action index (row-major cell) for the current board.
    /// When `training` is true, the agent may explore; otherwise it exploits.
    fn select_action(&mut self, board: &Board, training: bool) -> usize;

    /// Return the agent's display name.
    fn name(&self) -> &str;

    /// Record a transition and learn from it immediately.
    fn observe(&mut self, _transition: Transition) -> UpdateMetrics {
        UpdateMetrics::default()
    }

    /// Called once per finished episode, after the board was restarted.
    fn finish_episode(&mut self) -> UpdateMetrics {
        UpdateMetrics::default()
    }
}

/// Opaque eval state for enter/exit eval mode.
pub enum EvalState {
    Epsilon(f32),
    NoOp,
}

/// Extension trait for agents that support the full training lifecycle.
pub trait TrainableAgent: Agent {
    /// Algorithm name for logging and checkpoint metadata.
    fn algorithm_name(&self) -> &str;
    /// Completed training episodes (resume offset).
    fn episode_count(&self) -> usize;
    /// Completed learning steps.
    fn step_count(&self) -> usize;
    /// Current exploration rate.
    fn exploration_rate(&self) -> f32;
    /// Enter eval mode (pure exploitation). Returns state to restore.
    fn enter_eval_mode(&mut self) -> EvalState;
    /// Exit eval mode, restoring previous state.
    fn exit_eval_mode(&mut self, state: EvalState);
    /// Save network weights to a directory.
    fn save_weights_to_dir(&self, dir: &Path) -> Result<(), Box<dyn std::error::Error>>;
    /// Load network weights from a directory.
    fn load_weights_from_dir(&mut self, dir: &Path) -> Result<(), Box<dyn std::error::Error>>;
    /// Serialize training progress to JSON.
    fn training_state_json(&self) -> Result<String, serde_json::Error>;
    /// Restore training progress from JSON.
    fn restore_training_state_json(&mut self, json: &str) -> Result<(), serde_json::Error>;
    /// Build checkpoint metadata for this agent's algorithm.
    fn build_checkpoint_metadata(
        &self,
        metrics: &CheckpointMetrics,
        episode: usize,
        timestamp: u64,
    ) -> CheckpointMetadata;
}
