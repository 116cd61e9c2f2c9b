use crate::ai::Agent;
use crate::config::BoardConfig;
use crate::error::GameError;
use crate::game::{Board, GameStatus, RevealOutcome};

/// Reward per action outcome.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Opening a previously unknown safe cell, cascades included.
    pub safe_reveal: f32,
    pub mine: f32,
    /// Selecting a cell that cannot be opened.
    pub wasted_move: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        RewardConfig {
            safe_reveal: 10.0,
            mine: -10.0,
            wasted_move: -1.0,
        }
    }
}

/// What one reveal action did to the board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub outcome: RevealOutcome,
    pub reward: f32,
    pub terminal: bool,
    pub score: usize,
}

/// Reveal the cell at `action` and score the result.
pub fn apply_action(
    board: &mut Board,
    action: usize,
    rewards: &RewardConfig,
) -> Result<StepOutcome, GameError> {
    let outcome = board.reveal_index(action)?;
    let reward = match outcome {
        RevealOutcome::Revealed | RevealOutcome::Won => rewards.safe_reveal,
        RevealOutcome::HitMine => rewards.mine,
        RevealOutcome::NoChange => rewards.wasted_move,
    };
    Ok(StepOutcome {
        outcome,
        reward,
        terminal: board.is_terminal(),
        score: board.score(),
    })
}

/// Result of one greedy game.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameResult {
    pub won: bool,
    pub score: usize,
    pub total_reward: f32,
    pub steps: usize,
}

/// Play one game to the end without exploring or learning.
pub fn play_eval_game(
    agent: &mut dyn Agent,
    board: &mut Board,
    rewards: &RewardConfig,
) -> Result<GameResult, GameError> {
    let mut total_reward = 0.0;
    let mut steps = 0;
    let mut wasted_in_a_row = 0;

    while !board.is_terminal() {
        let action = agent.select_action(board, false);
        let step = apply_action(board, action, rewards)?;
        total_reward += step.reward;
        steps += 1;

        // a greedy agent that keeps choosing a dead cell would never finish
        if step.outcome == RevealOutcome::NoChange {
            wasted_in_a_row += 1;
            if wasted_in_a_row >= board.cell_count() {
                log::warn!("{} stalled after {} steps", agent.name(), steps);
                break;
            }
        } else {
            wasted_in_a_row = 0;
        }
    }

    Ok(GameResult {
        won: board.status() == GameStatus::Won,
        score: board.score(),
        total_reward,
        steps,
    })
}

/// Aggregate of an evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EvalSummary {
    pub games: usize,
    pub win_rate: f32,
    pub mean_score: f32,
}

/// Play `games` greedy games on boards seeded from `base_seed`.
pub fn evaluate(
    agent: &mut dyn Agent,
    board_config: &BoardConfig,
    rewards: &RewardConfig,
    games: usize,
    base_seed: u64,
) -> Result<EvalSummary, GameError> {
    if games == 0 {
        return Ok(EvalSummary::default());
    }

    let mut wins = 0;
    let mut total_score = 0;
    for game_idx in 0..games {
        let mut board = board_config.build_seeded(episode_seed(base_seed, game_idx))?;
        let result = play_eval_game(agent, &mut board, rewards)?;
        if result.won {
            wins += 1;
        }
        total_score += result.score;
    }

    Ok(EvalSummary {
        games,
        win_rate: wins as f32 / games as f32,
        mean_score: total_score as f32 / games as f32,
    })
}

/// Derive a deterministic seed for a given episode index.
pub fn episode_seed(base_seed: u64, episode_index: usize) -> u64 {
    // FNV-1a style mixing
    let mut hash = base_seed ^ 0x517cc1b727220a95;
    let index = episode_index as u64;
    hash = hash.wrapping_mul(0x100000001b3);
    hash ^= index;
    hash = hash.wrapping_mul(0x100000001b3);
    hash ^= index >> 32;
    hash
}
