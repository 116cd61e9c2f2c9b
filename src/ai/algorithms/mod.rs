mod dqn;

pub use dqn::{masked_argmax, DqnAgent, DqnConfig, InferBackend, TrainBackend};
