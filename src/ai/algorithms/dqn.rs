use std::error::Error;
use std::path::Path;

use burn::backend::Autodiff;
use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::record::DefaultRecorder;
use burn::tensor::TensorData;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::ai::agent::{Agent, EvalState, TrainableAgent, Transition, UpdateMetrics};
use crate::ai::networks::{QNetwork, QNetworkConfig};
use crate::ai::observation::{encode_observation, observations_batch};
use crate::checkpoint::{
    CheckpointHyperparameters, CheckpointMetadata, CheckpointMetrics, DqnTrainingState,
};
use crate::game::Board;
use crate::training::replay_buffer::ReplayBuffer;

#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray<f32>;
#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu<f32, i32>;
pub type TrainBackend = Autodiff<InferBackend>;

type QOptimizer =
    burn::optim::adaptor::OptimizerAdaptor<burn::optim::Adam, QNetwork<TrainBackend>, TrainBackend>;

/// DQN hyperparameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DqnConfig {
    pub learning_rate: f64,
    pub gamma: f32,
    pub epsilon_start: f32,
    pub epsilon_end: f32,
    pub epsilon_decay_episodes: usize,
    /// Bootstrap from a periodically synced copy instead of the live network.
    pub use_target_network: bool,
    /// Learning steps between hard target syncs.
    pub target_update_interval: usize,
    /// Long-term update batch size.
    pub batch_size: usize,
    pub replay_capacity: usize,
    pub hidden_size: usize,
    /// Seeds exploration and replay sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for DqnConfig {
    fn default() -> Self {
        DqnConfig {
            learning_rate: 1e-3,
            gamma: 0.9,
            epsilon_start: 1.0,
            epsilon_end: 0.05,
            epsilon_decay_episodes: 2000,
            use_target_network: true,
            target_update_interval: 100,
            batch_size: 256,
            replay_capacity: 100_000,
            hidden_size: 256,
            seed: None,
        }
    }
}

/// Index of the largest value among positions where `mask` is true.
///
/// Ties resolve to the lowest index. If nothing is open the mask is ignored.
pub fn masked_argmax(values: &[f32], mask: &[bool]) -> usize {
    debug_assert_eq!(values.len(), mask.len());
    let mut best: Option<(usize, f32)> = None;
    for (i, (&v, &open)) in values.iter().zip(mask).enumerate() {
        if !open {
            continue;
        }
        match best {
            Some((_, best_v)) if v <= best_v => {}
            _ => best = Some((i, v)),
        }
    }
    match best {
        Some((i, _)) => i,
        None => argmax(values),
    }
}

fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Deep Q-learning agent: live network, optional target network, replay
/// buffer and Adam optimizer.
pub struct DqnAgent {
    q_network: QNetwork<TrainBackend>,
    target_network: Option<QNetwork<InferBackend>>,
    optimizer: QOptimizer,
    replay_buffer: ReplayBuffer,
    config: DqnConfig,
    cells: usize,
    device: <TrainBackend as Backend>::Device,
    epsilon: f32,
    step_count: usize,
    episode_count: usize,
    rng: StdRng,
}

impl DqnAgent {
    /// Agent for a board of `cells` (n²) positions.
    pub fn new(config: DqnConfig, cells: usize) -> Self {
        assert!(cells > 0, "board must have at least one cell");
        let device = Default::default();
        let q_network: QNetwork<TrainBackend> = Self::network_config(&config, cells).init(&device);
        let target_network = config.use_target_network.then(|| q_network.valid());
        let optimizer = AdamConfig::new().init();

        let (rng, replay_buffer) = match config.seed {
            Some(seed) => (
                StdRng::seed_from_u64(seed),
                ReplayBuffer::with_seed(config.replay_capacity, seed.wrapping_add(1)),
            ),
            None => (StdRng::from_os_rng(), ReplayBuffer::new(config.replay_capacity)),
        };

        DqnAgent {
            q_network,
            target_network,
            optimizer,
            replay_buffer,
            epsilon: config.epsilon_start,
            config,
            cells,
            device,
            step_count: 0,
            episode_count: 0,
            rng,
        }
    }

    fn network_config(config: &DqnConfig, cells: usize) -> QNetworkConfig {
        QNetworkConfig::new(cells).with_hidden_size(config.hidden_size)
    }

    /// Epsilon-greedy over unrevealed cells when training, greedy otherwise.
    fn pick_action(&mut self, board: &Board, training: bool) -> usize {
        assert_eq!(
            board.cell_count(),
            self.cells,
            "board has {} cells, network expects {}",
            board.cell_count(),
            self.cells
        );

        if training && self.rng.random_range(0.0..1.0) < self.epsilon {
            let open: Vec<usize> = board.unrevealed_indices().collect();
            if !open.is_empty() {
                return open[self.rng.random_range(0..open.len())];
            }
        }

        let q_values = self.q_values(&encode_observation(board));
        masked_argmax(&q_values, board.action_mask())
    }

    /// Q-values of the live network for one observation.
    pub fn q_values(&self, observation: &[f32]) -> Vec<f32> {
        let input = observations_batch::<InferBackend>(&[observation], self.cells, &self.device);
        self.q_network
            .valid()
            .forward(input)
            .into_data()
            .to_vec()
            .expect("f32 tensor data extraction")
    }

    /// Q-values of the target network, if one is kept.
    pub fn target_q_values(&self, observation: &[f32]) -> Option<Vec<f32>> {
        let target = self.target_network.as_ref()?;
        let input = observations_batch::<InferBackend>(&[observation], self.cells, &self.device);
        Some(
            target
                .forward(input)
                .into_data()
                .to_vec()
                .expect("f32 tensor data extraction"),
        )
    }

    /// One gradient step on `batch`. Returns the loss.
    ///
    /// Each row's target is the current prediction with the taken action's
    /// entry replaced by `r` (terminal) or `r + gamma * max Q(s')`.
    pub fn learn(&mut self, batch: &[Transition]) -> f32 {
        let batch_size = batch.len();
        assert!(batch_size > 0, "cannot learn from an empty batch");
        let n = self.cells;

        let observations: Vec<&[f32]> = batch.iter().map(|t| t.observation.as_slice()).collect();
        let states = observations_batch::<TrainBackend>(&observations, n, &self.device);
        let q_all = self.q_network.forward(states); // [B, n]
        let mut target_data: Vec<f32> = q_all
            .clone()
            .into_data()
            .to_vec()
            .expect("f32 tensor data extraction");

        for (i, (t, y)) in batch.iter().zip(self.bootstrap_targets(batch)).enumerate() {
            assert!(t.action < n, "action {} out of range for {} cells", t.action, n);
            target_data[i * n + t.action] = y;
        }

        let targets = Tensor::<TrainBackend, 1>::from_data(
            TensorData::from(target_data.as_slice()),
            &self.device,
        )
        .reshape([batch_size as i32, n as i32]);

        let diff = q_all - targets;
        let loss = (diff.clone() * diff).mean();
        let loss_val: f32 = loss
            .clone()
            .into_data()
            .to_vec::<f32>()
            .expect("f32 loss tensor extraction")[0];

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.q_network);
        self.q_network = self
            .optimizer
            .step(self.config.learning_rate, self.q_network.clone(), grads);

        self.step_count += 1;
        if self.target_network.is_some()
            && self.config.target_update_interval > 0
            && self.step_count % self.config.target_update_interval == 0
        {
            self.sync_target();
        }

        loss_val
    }

    /// Regression target per transition: `r` when terminal, otherwise
    /// `r + gamma * max_a Q(s', a)` read from the target network, or from the
    /// live network when no target is kept.
    pub fn bootstrap_targets(&self, batch: &[Transition]) -> Vec<f32> {
        let n = self.cells;
        let next_observations: Vec<&[f32]> =
            batch.iter().map(|t| t.next_observation.as_slice()).collect();
        let next_states = observations_batch::<InferBackend>(&next_observations, n, &self.device);
        let next_q = match &self.target_network {
            Some(target) => target.forward(next_states),
            None => self.q_network.valid().forward(next_states),
        };
        let next_q_data: Vec<f32> = next_q
            .into_data()
            .to_vec()
            .expect("f32 tensor data extraction");

        batch
            .iter()
            .zip(next_q_data.chunks(n))
            .map(|(t, row)| {
                if t.terminal {
                    t.reward
                } else {
                    let max_q = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                    t.reward + self.config.gamma * max_q
                }
            })
            .collect()
    }

    /// Copy live weights into the target network.
    pub fn sync_target(&mut self) {
        if self.target_network.is_some() {
            self.target_network = Some(self.q_network.valid());
        }
    }

    pub fn remember(&mut self, transition: Transition) {
        self.replay_buffer.push(transition);
    }

    /// Short-term update on a single transition.
    pub fn train_short(&mut self, transition: &Transition) -> f32 {
        self.learn(std::slice::from_ref(transition))
    }

    /// Long-term update on up to `batch_size` sampled transitions.
    /// `None` when the buffer is empty.
    pub fn train_long(&mut self) -> Option<(f32, usize)> {
        let batch = self.replay_buffer.sample_up_to(self.config.batch_size);
        if batch.is_empty() {
            return None;
        }
        let loss = self.learn(&batch);
        Some((loss, batch.len()))
    }

    /// Count the finished episode and decay epsilon.
    pub fn end_episode(&mut self) {
        self.episode_count += 1;
        self.decay_epsilon();
    }

    /// Linear schedule over episodes; epsilon never rises and never drops
    /// below `epsilon_end`.
    fn decay_epsilon(&mut self) {
        let scheduled = if self.config.epsilon_decay_episodes == 0 {
            self.config.epsilon_end
        } else {
            let progress = (self.episode_count as f32 / self.config.epsilon_decay_episodes as f32)
                .min(1.0);
            self.config.epsilon_start
                + (self.config.epsilon_end - self.config.epsilon_start) * progress
        };
        self.epsilon = self.epsilon.min(scheduled);
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Set epsilon directly (e.g. 0.0 for pure greedy play).
    pub fn set_epsilon(&mut self, eps: f32) {
        self.epsilon = eps;
    }

    pub fn config(&self) -> &DqnConfig {
        &self.config
    }

    pub fn cells(&self) -> usize {
        self.cells
    }

    pub fn replay_len(&self) -> usize {
        self.replay_buffer.len()
    }

    /// Save network weights to a directory.
    pub fn save_to_dir(&self, dir: &Path) -> Result<(), Box<dyn Error>> {
        let recorder = DefaultRecorder::default();
        self.q_network
            .valid()
            .save_file(dir.join("q_network"), &recorder)?;
        if let Some(target) = &self.target_network {
            target
                .clone()
                .save_file(dir.join("target_network"), &recorder)?;
        }
        Ok(())
    }

    /// Load network weights from a directory. A missing target file falls
    /// back to a copy of the loaded live network.
    pub fn load_from_dir(&mut self, dir: &Path) -> Result<(), Box<dyn Error>> {
        let recorder = DefaultRecorder::default();
        let net_config = Self::network_config(&self.config, self.cells);

        let q: QNetwork<TrainBackend> = net_config
            .init(&self.device)
            .load_file(dir.join("q_network"), &recorder, &self.device)?;
        self.q_network = q;

        if self.config.use_target_network {
            let target_path = dir.join("target_network.mpk");
            self.target_network = if target_path.exists() {
                let target: QNetwork<InferBackend> = net_config.init(&self.device).load_file(
                    dir.join("target_network"),
                    &recorder,
                    &self.device,
                )?;
                Some(target)
            } else {
                Some(self.q_network.valid())
            };
        }
        Ok(())
    }

    /// Export current training progress for checkpointing.
    pub fn training_state(&self) -> DqnTrainingState {
        DqnTrainingState {
            epsilon: self.epsilon,
            step_count: self.step_count,
            episode_count: self.episode_count,
        }
    }

    /// Restore progress counters. Hyperparameters stay as configured.
    pub fn restore_training_state(&mut self, state: &DqnTrainingState) {
        self.epsilon = state.epsilon;
        self.step_count = state.step_count;
        self.episode_count = state.episode_count;
    }
}

impl Agent for DqnAgent {
    fn select_action(&mut self, board: &Board, training: bool) -> usize {
        self.pick_action(board, training)
    }

    fn name(&self) -> &str {
        "DQN"
    }

    fn observe(&mut self, transition: Transition) -> UpdateMetrics {
        self.remember(transition.clone());
        let loss = self.train_short(&transition);
        UpdateMetrics {
            loss,
            batch_size: 1,
        }
    }

    fn finish_episode(&mut self) -> UpdateMetrics {
        let metrics = match self.train_long() {
            Some((loss, batch_size)) => UpdateMetrics { loss, batch_size },
            None => UpdateMetrics::default(),
        };
        self.end_episode();
        metrics
    }
}

impl TrainableAgent for DqnAgent {
    fn algorithm_name(&self) -> &str {
        "DQN"
    }

    fn episode_count(&self) -> usize {
        self.episode_count
    }

    fn step_count(&self) -> usize {
        self.step_count
    }

    fn exploration_rate(&self) -> f32 {
        self.epsilon
    }

    fn enter_eval_mode(&mut self) -> EvalState {
        let saved = self.epsilon;
        self.epsilon = 0.0;
        EvalState::Epsilon(saved)
    }

    fn exit_eval_mode(&mut self, state: EvalState) {
        if let EvalState::Epsilon(eps) = state {
            self.epsilon = eps;
        }
    }

    fn save_weights_to_dir(&self, dir: &Path) -> Result<(), Box<dyn Error>> {
        self.save_to_dir(dir)
    }

    fn load_weights_from_dir(&mut self, dir: &Path) -> Result<(), Box<dyn Error>> {
        self.load_from_dir(dir)
    }

    fn training_state_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.training_state())
    }

    fn restore_training_state_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let state: DqnTrainingState = serde_json::from_str(json)?;
        self.restore_training_state(&state);
        Ok(())
    }

    fn build_checkpoint_metadata(
        &self,
        metrics: &CheckpointMetrics,
        episode: usize,
        timestamp: u64,
    ) -> CheckpointMetadata {
        let c = &self.config;
        CheckpointMetadata {
            episode,
            timestamp,
            algorithm: self.algorithm_name().to_string(),
            board_cells: self.cells,
            metrics: metrics.clone(),
            hyperparameters: CheckpointHyperparameters {
                learning_rate: c.learning_rate,
                gamma: c.gamma,
                epsilon: self.epsilon,
                epsilon_start: c.epsilon_start,
                epsilon_end: c.epsilon_end,
                epsilon_decay_episodes: c.epsilon_decay_episodes,
                batch_size: c.batch_size,
                use_target_network: c.use_target_network,
                target_update_interval: c.target_update_interval,
                replay_capacity: c.replay_capacity,
                hidden_size: c.hidden_size,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::observation::UNKNOWN;

    fn small_config() -> DqnConfig {
        DqnConfig {
            hidden_size: 32,
            batch_size: 8,
            replay_capacity: 64,
            seed: Some(11),
            ..Default::default()
        }
    }

    fn transition(cells: usize, action: usize, reward: f32, terminal: bool) -> Transition {
        Transition {
            observation: vec![UNKNOWN; cells],
            action,
            reward,
            next_observation: vec![0.0; cells],
            terminal,
        }
    }

    fn opened_board() -> Board {
        // (0, 0) opens the top-left corner region only
        let mut board = Board::with_mines(4, &[(2, 2), (3, 0), (0, 3)]).unwrap();
        board.reveal(0, 0).unwrap();
        board
    }

    #[test]
    fn test_masked_argmax() {
        let values = [0.5, 3.0, 3.0, -1.0];
        assert_eq!(masked_argmax(&values, &[true, true, true, true]), 1);
        assert_eq!(masked_argmax(&values, &[true, false, true, true]), 2);
        assert_eq!(masked_argmax(&values, &[false, false, false, true]), 3);
        // nothing open: plain argmax
        assert_eq!(masked_argmax(&values, &[false; 4]), 1);
    }

    #[test]
    fn test_greedy_action_is_unrevealed() {
        let mut agent = DqnAgent::new(small_config(), 16);
        agent.set_epsilon(0.0);
        let board = opened_board();
        for _ in 0..5 {
            let action = agent.select_action(&board, false);
            assert!(board.action_mask()[action], "action {} already revealed", action);
        }
    }

    #[test]
    fn test_exploratory_action_is_unrevealed() {
        let mut agent = DqnAgent::new(small_config(), 16);
        agent.set_epsilon(1.0);
        let board = opened_board();
        for _ in 0..100 {
            let action = agent.select_action(&board, true);
            assert!(board.action_mask()[action], "action {} already revealed", action);
        }
    }

    #[test]
    fn test_long_update_on_empty_buffer_is_noop() {
        let mut agent = DqnAgent::new(small_config(), 9);
        assert!(agent.train_long().is_none());
        assert_eq!(agent.step_count(), 0);

        let metrics = agent.finish_episode();
        assert_eq!(metrics.batch_size, 0);
        assert_eq!(agent.episode_count(), 1);
    }

    #[test]
    fn test_long_update_clamps_to_buffer() {
        let mut agent = DqnAgent::new(small_config(), 9);
        for a in 0..3 {
            agent.remember(transition(9, a, 10.0, false));
        }
        let (_, batch_size) = agent.train_long().unwrap();
        assert_eq!(batch_size, 3);
        assert_eq!(agent.step_count(), 1);
    }

    #[test]
    fn test_observe_stores_and_learns() {
        let mut agent = DqnAgent::new(small_config(), 9);
        let metrics = agent.observe(transition(9, 4, -10.0, true));
        assert_eq!(metrics.batch_size, 1);
        assert!(metrics.loss.is_finite());
        assert_eq!(agent.replay_len(), 1);
        assert_eq!(agent.step_count(), 1);
    }

    #[test]
    fn test_target_syncs_after_interval() {
        let config = DqnConfig {
            target_update_interval: 3,
            learning_rate: 1e-2,
            ..small_config()
        };
        let mut agent = DqnAgent::new(config, 9);
        let t = transition(9, 2, 10.0, false);
        let probe = vec![UNKNOWN; 9];

        agent.train_short(&t);
        agent.train_short(&t);
        let live = agent.q_values(&probe);
        let target = agent.target_q_values(&probe).unwrap();
        assert_ne!(live, target, "target should lag before the sync");

        agent.train_short(&t);
        let live = agent.q_values(&probe);
        let target = agent.target_q_values(&probe).unwrap();
        for (a, b) in live.iter().zip(&target) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    fn max_of(values: &[f32]) -> f32 {
        values.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Live agent whose target network still holds the initial weights while
    /// the live network has been pushed up on `next`.
    fn diverged_agent(next: &[f32]) -> DqnAgent {
        let config = DqnConfig {
            target_update_interval: 10_000,
            learning_rate: 1e-2,
            gamma: 0.9,
            ..small_config()
        };
        let mut agent = DqnAgent::new(config, 9);
        let lift = Transition {
            observation: next.to_vec(),
            action: 0,
            reward: 50.0,
            next_observation: next.to_vec(),
            terminal: true,
        };
        for _ in 0..200 {
            agent.train_short(&lift);
        }
        agent
    }

    #[test]
    fn test_bootstrap_reads_frozen_target() {
        let next = vec![1.0; 9];
        let agent = diverged_agent(&next);

        let target_max = max_of(&agent.target_q_values(&next).unwrap());
        let live_max = max_of(&agent.q_values(&next));
        assert!(live_max - target_max > 5.0, "live {} target {}", live_max, target_max);

        let t = Transition {
            observation: vec![UNKNOWN; 9],
            action: 4,
            reward: 10.0,
            next_observation: next.clone(),
            terminal: false,
        };
        let y = agent.bootstrap_targets(std::slice::from_ref(&t))[0];
        assert!((y - (10.0 + 0.9 * target_max)).abs() < 1e-4, "y = {}", y);
        assert!((y - (10.0 + 0.9 * live_max)).abs() > 1.0);

        let terminal = Transition { terminal: true, ..t };
        assert_eq!(agent.bootstrap_targets(&[terminal]), vec![10.0]);
    }

    #[test]
    fn test_bootstrap_without_target_reads_live() {
        let config = DqnConfig {
            use_target_network: false,
            gamma: 0.5,
            ..small_config()
        };
        let agent = DqnAgent::new(config, 9);
        let next = vec![1.0; 9];
        let t = Transition {
            observation: vec![UNKNOWN; 9],
            action: 2,
            reward: -1.0,
            next_observation: next.clone(),
            terminal: false,
        };
        let expected = -1.0 + 0.5 * max_of(&agent.q_values(&next));
        let y = agent.bootstrap_targets(&[t])[0];
        assert!((y - expected).abs() < 1e-4);
    }

    #[test]
    fn test_non_terminal_update_moves_q_toward_bootstrap() {
        let next = vec![1.0; 9];
        let mut agent = diverged_agent(&next);
        let t = Transition {
            observation: vec![UNKNOWN; 9],
            action: 4,
            reward: 10.0,
            next_observation: next,
            terminal: false,
        };
        // target is frozen, so the regression target stays put
        let y = agent.bootstrap_targets(std::slice::from_ref(&t))[0];

        let before = (agent.q_values(&t.observation)[4] - y).abs();
        for _ in 0..200 {
            agent.train_short(&t);
        }
        assert_eq!(agent.bootstrap_targets(std::slice::from_ref(&t))[0], y);
        let after = (agent.q_values(&t.observation)[4] - y).abs();
        assert!(after < before * 0.5, "error {} did not shrink from {}", after, before);
    }

    #[test]
    fn test_without_target_network() {
        let config = DqnConfig {
            use_target_network: false,
            ..small_config()
        };
        let mut agent = DqnAgent::new(config, 9);
        assert!(agent.target_q_values(&[UNKNOWN; 9]).is_none());
        let loss = agent.train_short(&transition(9, 0, 10.0, false));
        assert!(loss.is_finite());
    }

    #[test]
    fn test_learning_moves_q_toward_reward() {
        let config = DqnConfig {
            learning_rate: 1e-2,
            ..small_config()
        };
        let mut agent = DqnAgent::new(config, 9);
        let t = transition(9, 4, 10.0, true);

        let before = (agent.q_values(&t.observation)[4] - 10.0).abs();
        for _ in 0..100 {
            agent.train_short(&t);
        }
        let after = (agent.q_values(&t.observation)[4] - 10.0).abs();
        assert!(after < before, "error {} did not shrink from {}", after, before);
    }

    #[test]
    fn test_epsilon_decay_is_monotone_and_floored() {
        let mut agent = DqnAgent::new(
            DqnConfig {
                epsilon_start: 1.0,
                epsilon_end: 0.1,
                epsilon_decay_episodes: 100,
                ..small_config()
            },
            9,
        );

        let mut previous = agent.epsilon();
        for _ in 0..50 {
            agent.end_episode();
            assert!(agent.epsilon() <= previous);
            previous = agent.epsilon();
        }
        let expected = 1.0 + (0.1 - 1.0) * 0.5;
        assert!((agent.epsilon() - expected).abs() < 1e-4);

        for _ in 0..200 {
            agent.end_episode();
        }
        assert!((agent.epsilon() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_epsilon_decay_zero_episodes() {
        let mut agent = DqnAgent::new(
            DqnConfig {
                epsilon_start: 1.0,
                epsilon_end: 0.05,
                epsilon_decay_episodes: 0,
                ..small_config()
            },
            9,
        );
        agent.end_episode();
        assert!((agent.epsilon() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_eval_mode_restores_epsilon() {
        let mut agent = DqnAgent::new(small_config(), 9);
        agent.set_epsilon(0.3);
        let saved = agent.enter_eval_mode();
        assert_eq!(agent.exploration_rate(), 0.0);
        agent.exit_eval_mode(saved);
        assert!((agent.exploration_rate() - 0.3).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "observation length mismatch")]
    fn test_wrong_observation_length_panics() {
        let agent = DqnAgent::new(small_config(), 9);
        agent.q_values(&[0.0; 4]);
    }

    #[test]
    fn test_save_and_load_preserves_q_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = DqnAgent::new(small_config(), 9);
        agent.train_short(&transition(9, 1, 10.0, false));
        agent.save_to_dir(dir.path()).unwrap();
        assert!(dir.path().join("q_network.mpk").exists());
        assert!(dir.path().join("target_network.mpk").exists());

        let probe = vec![UNKNOWN; 9];
        let expected = agent.q_values(&probe);

        let mut restored = DqnAgent::new(small_config(), 9);
        restored.load_from_dir(dir.path()).unwrap();
        let actual = restored.q_values(&probe);
        for (a, b) in expected.iter().zip(&actual) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn test_training_state_roundtrip() {
        let mut agent = DqnAgent::new(small_config(), 9);
        agent.set_epsilon(0.42);
        agent.end_episode();
        agent.train_short(&transition(9, 0, 10.0, true));

        let json = agent.training_state_json().unwrap();
        let mut restored = DqnAgent::new(small_config(), 9);
        restored.restore_training_state_json(&json).unwrap();
        assert_eq!(restored.training_state(), agent.training_state());
        assert_eq!(restored.episode_count(), 1);
        assert_eq!(restored.step_count(), 1);
    }
}
