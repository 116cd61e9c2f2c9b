use std::path::Path;

use crate::ai::algorithms::DqnConfig;
use crate::checkpoint::CheckpointManagerConfig;
use crate::error::{ConfigError, GameError};
use crate::game::Board;
use crate::training::episode::RewardConfig;
use crate::training::trainer::TrainerConfig;

/// Board dimensions and mine count.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub size: usize,
    pub mines: usize,
    /// Seeds mine placement for the training board.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            size: 8,
            mines: 10,
            seed: None,
        }
    }
}

impl BoardConfig {
    pub fn cells(&self) -> usize {
        self.size * self.size
    }

    /// Build a board, seeded when `seed` is set.
    pub fn build(&self) -> Result<Board, GameError> {
        match self.seed {
            Some(seed) => Board::with_seed(self.size, self.mines, seed),
            None => Board::new(self.size, self.mines),
        }
    }

    /// Build a board with an explicit placement seed.
    pub fn build_seeded(&self, seed: u64) -> Result<Board, GameError> {
        Board::with_seed(self.size, self.mines, seed)
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub board: BoardConfig,
    pub dqn: DqnConfig,
    pub rewards: RewardConfig,
    pub training: TrainerConfig,
    pub checkpoint: CheckpointManagerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: &str| -> Result<(), ConfigError> {
            Err(ConfigError::Validation(msg.into()))
        };

        if self.board.size == 0 {
            return fail("board.size must be >= 1");
        }
        if self.board.mines >= self.board.cells() {
            return Err(ConfigError::Validation(format!(
                "board.mines ({}) must be < board cells ({})",
                self.board.mines,
                self.board.cells()
            )));
        }

        if self.dqn.learning_rate <= 0.0 {
            return fail("dqn.learning_rate must be > 0");
        }
        if self.dqn.gamma < 0.0 || self.dqn.gamma > 1.0 {
            return fail("dqn.gamma must be in [0, 1]");
        }
        if self.dqn.epsilon_start < 0.0 || self.dqn.epsilon_start > 1.0 {
            return fail("dqn.epsilon_start must be in [0, 1]");
        }
        if self.dqn.epsilon_end < 0.0 || self.dqn.epsilon_end > 1.0 {
            return fail("dqn.epsilon_end must be in [0, 1]");
        }
        if self.dqn.epsilon_end > self.dqn.epsilon_start {
            return fail("dqn.epsilon_end must be <= dqn.epsilon_start");
        }
        if self.dqn.batch_size == 0 {
            return fail("dqn.batch_size must be > 0");
        }
        if self.dqn.replay_capacity < self.dqn.batch_size {
            return fail("dqn.replay_capacity must be >= dqn.batch_size");
        }
        if self.dqn.use_target_network && self.dqn.target_update_interval == 0 {
            return fail("dqn.target_update_interval must be > 0");
        }
        if self.dqn.hidden_size == 0 {
            return fail("dqn.hidden_size must be > 0");
        }

        if self.training.num_episodes == 0 {
            return fail("training.num_episodes must be > 0");
        }
        if self.training.log_interval == 0 {
            return fail("training.log_interval must be > 0");
        }
        if self.training.eval_interval == 0 {
            return fail("training.eval_interval must be > 0");
        }
        if self.training.checkpoint_interval == 0 {
            return fail("training.checkpoint_interval must be > 0");
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().expect("default config should be valid");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[board]
size = 12
mines = 20

[dqn]
learning_rate = 0.01
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.board.size, 12);
        assert_eq!(config.board.mines, 20);
        assert!(config.board.seed.is_none());
        assert!((config.dqn.learning_rate - 0.01).abs() < 1e-9);
        // Other fields should be defaults
        assert!((config.dqn.gamma - 0.9).abs() < 1e-6);
        assert!((config.rewards.safe_reveal - 10.0).abs() < 1e-6);
        assert_eq!(config.training.num_episodes, TrainerConfig::default().num_episodes);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        let default = AppConfig::default();
        assert_eq!(config.board.size, default.board.size);
        assert_eq!(config.dqn.batch_size, default.dqn.batch_size);
        assert_eq!(config.training.num_episodes, default.training.num_episodes);
    }

    #[test]
    fn test_validation_rejects_too_many_mines() {
        let mut config = AppConfig::default();
        config.board.mines = 64;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("board.mines"));
    }

    #[test]
    fn test_validation_rejects_empty_board() {
        let mut config = AppConfig::default();
        config.board.size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_negative_lr() {
        let mut config = AppConfig::default();
        config.dqn.learning_rate = -0.001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_invalid_gamma() {
        let mut config = AppConfig::default();
        config.dqn.gamma = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_epsilon_end_gt_start() {
        let mut config = AppConfig::default();
        config.dqn.epsilon_start = 0.1;
        config.dqn.epsilon_end = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_replay_capacity_lt_batch() {
        let mut config = AppConfig::default();
        config.dqn.replay_capacity = 10;
        config.dqn.batch_size = 64;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_sync_period() {
        let mut config = AppConfig::default();
        config.dqn.target_update_interval = 0;
        assert!(config.validate().is_err());

        config.dqn.use_target_network = false;
        config.validate().expect("sync period is unused without a target network");
    }

    #[test]
    fn test_validation_rejects_zero_episodes() {
        let mut config = AppConfig::default();
        config.training.num_episodes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("nonexistent_config.toml")).unwrap();
        assert_eq!(config.board.size, 8);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
[board]
seed = 7

[training]
num_episodes = 500
"#
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.training.num_episodes, 500);
        assert_eq!(config.board.seed, Some(7));
        assert!((config.dqn.learning_rate - 1e-3).abs() < 1e-9);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[board]\nsize = 3\nmines = 9\n").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let toml_str = AppConfig::default_toml();
        let config: AppConfig = toml::from_str(&toml_str).unwrap();
        config.validate().expect("roundtripped config should be valid");
    }

    #[test]
    fn test_seeded_boards_match() {
        let config = BoardConfig {
            size: 6,
            mines: 5,
            seed: Some(3),
        };
        let mut a = config.build().unwrap();
        let mut b = config.build().unwrap();
        a.reveal(0, 0).unwrap();
        b.reveal(0, 0).unwrap();
        assert_eq!(a.cells(), b.cells());
    }
}
