use std::path::PathBuf;

/// Errors raised by the board engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("invalid board size {0} (must be >= 1)")]
    InvalidSize(usize),

    #[error("coordinates ({x}, {y}) are outside a {size}x{size} board")]
    InvalidCoords { x: usize, y: usize, size: usize },

    #[error("too many mines: {mines} requested for {cells} cells")]
    TooManyMines { mines: usize, cells: usize },

    #[error("cannot place {mines} mines: only {available} cells lie outside the opening area")]
    NotEnoughSafeCells { mines: usize, available: usize },
}

/// Errors that can occur during checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("checkpoint not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read metadata from {path}: {source}")]
    MetadataRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse metadata from {path}: {source}")]
    MetadataParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to save model: {0}")]
    ModelSave(String),

    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during training.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("game error: {0}")]
    Game(#[from] GameError),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_error_display() {
        let err = GameError::InvalidCoords { x: 9, y: 2, size: 8 };
        assert_eq!(
            err.to_string(),
            "coordinates (9, 2) are outside a 8x8 board"
        );
    }

    #[test]
    fn test_checkpoint_error_display() {
        let err = CheckpointError::NotFound(PathBuf::from("checkpoints/best"));
        assert_eq!(err.to_string(), "checkpoint not found: checkpoints/best");
    }

    #[test]
    fn test_training_error_wraps_game_error() {
        let err: TrainingError = GameError::TooManyMines { mines: 30, cells: 25 }.into();
        assert_eq!(
            err.to_string(),
            "game error: too many mines: 30 requested for 25 cells"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("dqn.learning_rate must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: dqn.learning_rate must be > 0"
        );
    }
}
