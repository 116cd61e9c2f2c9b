use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use super::agent::Agent;
use crate::game::Board;

/// An agent that opens a uniformly random unrevealed cell.
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new() -> Self {
        RandomAgent {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        RandomAgent {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAgent {
    fn select_action(&mut self, board: &Board, _training: bool) -> usize {
        let open: Vec<usize> = board.unrevealed_indices().collect();
        assert!(!open.is_empty(), "No unrevealed cells available");
        open[self.rng.random_range(0..open.len())]
    }

    fn name(&self) -> &str {
        "Random"
    }
}
