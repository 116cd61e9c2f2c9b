use std::collections::VecDeque;

/// Result of a single training episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeResult {
    pub won: bool,
    /// Revealed cells when the episode ended.
    pub score: usize,
    pub total_reward: f32,
    pub steps: usize,
}

/// Training metrics tracker with rolling window computations.
pub struct TrainingMetrics {
    episode_results: VecDeque<EpisodeResult>,
    update_losses: VecDeque<f32>,
    capacity: usize,
    total_episodes: usize, // lifetime count, never capped
    best_score: usize,
}

impl TrainingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TrainingMetrics {
            episode_results: VecDeque::with_capacity(capacity),
            update_losses: VecDeque::with_capacity(capacity),
            capacity,
            total_episodes: 0,
            best_score: 0,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Record a finished episode. Returns true when its score is a new record.
    pub fn record_episode(&mut self, result: EpisodeResult) -> bool {
        self.total_episodes += 1;
        let record = result.score > self.best_score;
        if record {
            self.best_score = result.score;
        }
        self.episode_results.push_back(result);
        if self.episode_results.len() > self.capacity {
            self.episode_results.pop_front();
        }
        record
    }

    pub fn record_update(&mut self, loss: f32) {
        self.update_losses.push_back(loss);
        if self.update_losses.len() > self.capacity {
            self.update_losses.pop_front();
        }
    }

    /// Restore the record from a previous run so resumed training does not
    /// overwrite a better checkpoint.
    pub fn set_best_score(&mut self, best_score: usize) {
        self.best_score = best_score;
    }

    fn recent(&self, last_n: usize) -> impl Iterator<Item = &EpisodeResult> {
        self.episode_results.iter().rev().take(last_n)
    }

    fn window(&self, last_n: usize) -> usize {
        self.episode_results.len().min(last_n)
    }

    /// Fraction of won episodes among the last N.
    pub fn win_rate(&self, last_n: usize) -> f32 {
        let n = self.window(last_n);
        if n == 0 {
            return 0.0;
        }
        let wins = self.recent(n).filter(|r| r.won).count();
        wins as f32 / n as f32
    }

    pub fn mean_score(&self, last_n: usize) -> f32 {
        let n = self.window(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: usize = self.recent(n).map(|r| r.score).sum();
        total as f32 / n as f32
    }

    pub fn average_reward(&self, last_n: usize) -> f32 {
        let n = self.window(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: f32 = self.recent(n).map(|r| r.total_reward).sum();
        total / n as f32
    }

    /// Average loss over the last N updates.
    pub fn average_loss(&self, last_n: usize) -> f32 {
        let n = self.update_losses.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let sum: f32 = self.update_losses.iter().rev().take(n).sum();
        sum / n as f32
    }

    pub fn best_score(&self) -> usize {
        self.best_score
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new()
    }
}
