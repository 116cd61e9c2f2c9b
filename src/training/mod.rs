//! Training infrastructure: the episode loop, replay buffer, rewards,
//! evaluation, metrics collection and telemetry sinks.

pub mod episode;
pub mod metrics;
pub mod replay_buffer;
pub mod telemetry;
pub mod trainer;

pub use episode::{apply_action, evaluate, EvalSummary, RewardConfig, StepOutcome};
pub use replay_buffer::ReplayBuffer;
pub use telemetry::{ChannelTelemetry, LogTelemetry, NullTelemetry, Telemetry, TrainingUpdate};
pub use trainer::{Trainer, TrainerConfig, TrainingSummary};
