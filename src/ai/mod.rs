mod agent;
pub mod algorithms;
pub mod networks;
pub mod observation;
mod random;

pub use agent::{Agent, EvalState, TrainableAgent, Transition, UpdateMetrics};
pub use algorithms::{DqnAgent, DqnConfig};
pub use networks::{QNetwork, QNetworkConfig};
pub use observation::encode_observation;
pub use random::RandomAgent;
