use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ai::TrainableAgent;
use crate::checkpoint::metadata::{CheckpointMetadata, CheckpointMetrics};
use crate::error::CheckpointError;

/// Configuration for the checkpoint manager.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CheckpointManagerConfig {
    pub checkpoint_dir: PathBuf,
    /// Save a `best` checkpoint whenever an episode sets a new record score.
    pub save_best: bool,
}

impl Default for CheckpointManagerConfig {
    fn default() -> Self {
        CheckpointManagerConfig {
            checkpoint_dir: PathBuf::from("checkpoints"),
            save_best: true,
        }
    }
}

/// Algorithm-agnostic checkpoint data. The agent deserializes its own training state.
#[derive(Debug)]
pub struct AgentCheckpointData {
    pub path: PathBuf,
    pub metadata: CheckpointMetadata,
    pub training_state_json: String,
}

/// Saves and loads named checkpoints under one directory.
pub struct CheckpointManager {
    config: CheckpointManagerConfig,
}

impl CheckpointManager {
    pub fn new(config: CheckpointManagerConfig) -> Self {
        CheckpointManager { config }
    }

    pub fn config(&self) -> &CheckpointManagerConfig {
        &self.config
    }

    pub fn checkpoint_path(&self, name: &str) -> PathBuf {
        self.config.checkpoint_dir.join(name)
    }

    /// Write `<dir>/<name>/` through a temporary directory so a crash never
    /// leaves a half-written checkpoint under the final name.
    pub fn save_checkpoint(
        &self,
        agent: &dyn TrainableAgent,
        metrics: &CheckpointMetrics,
        episode: usize,
        name: &str,
    ) -> Result<PathBuf, CheckpointError> {
        let tmp_dir = self.config.checkpoint_dir.join(format!("{}.tmp", name));
        let final_dir = self.checkpoint_path(name);

        if tmp_dir.exists() {
            fs::remove_dir_all(&tmp_dir)?;
        }
        fs::create_dir_all(&tmp_dir)?;

        agent
            .save_weights_to_dir(&tmp_dir)
            .map_err(|e| CheckpointError::ModelSave(e.to_string()))?;

        fs::write(tmp_dir.join("training_state.json"), agent.training_state_json()?)?;

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let metadata = agent.build_checkpoint_metadata(metrics, episode, timestamp);
        let meta_json = serde_json::to_string_pretty(&metadata)?;
        fs::write(tmp_dir.join("metadata.json"), meta_json)?;

        if final_dir.exists() {
            fs::remove_dir_all(&final_dir)?;
        }
        fs::rename(&tmp_dir, &final_dir)?;
        log::debug!("checkpoint '{}' written for episode {}", name, episode);

        Ok(final_dir)
    }

    /// Load the checkpoint stored under `name`.
    pub fn load_checkpoint(&self, name: &str) -> Result<AgentCheckpointData, CheckpointError> {
        self.load_checkpoint_dir(&self.checkpoint_path(name))
    }

    /// Load checkpoint data from an explicit directory.
    pub fn load_checkpoint_dir(&self, dir: &Path) -> Result<AgentCheckpointData, CheckpointError> {
        if !dir.is_dir() {
            return Err(CheckpointError::NotFound(dir.to_path_buf()));
        }
        let meta_path = dir.join("metadata.json");
        let ts_path = dir.join("training_state.json");

        let meta_json = fs::read_to_string(&meta_path).map_err(|e| {
            CheckpointError::MetadataRead {
                path: meta_path.clone(),
                source: e,
            }
        })?;
        let metadata: CheckpointMetadata =
            serde_json::from_str(&meta_json).map_err(|e| CheckpointError::MetadataParse {
                path: meta_path,
                source: e,
            })?;

        let training_state_json =
            fs::read_to_string(&ts_path).map_err(|e| CheckpointError::MetadataRead {
                path: ts_path,
                source: e,
            })?;

        Ok(AgentCheckpointData {
            path: dir.to_path_buf(),
            metadata,
            training_state_json,
        })
    }

    /// Restore weights and training progress into `agent`.
    pub fn restore_into(
        &self,
        agent: &mut dyn TrainableAgent,
        data: &AgentCheckpointData,
    ) -> Result<(), CheckpointError> {
        agent
            .load_weights_from_dir(&data.path)
            .map_err(|e| CheckpointError::ModelLoad(e.to_string()))?;
        agent.restore_training_state_json(&data.training_state_json)?;
        Ok(())
    }
}
