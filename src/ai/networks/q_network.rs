use burn::nn::{Linear, LinearConfig, Relu};
use burn::prelude::*;

/// Q-network mapping a flattened board to one action value per cell.
///
/// ```text
/// Input:  [batch, n²]
/// FC1:    n² -> hidden, ReLU
/// FC2:    hidden -> hidden, ReLU
/// FC3:    hidden -> n²  (Q-values, one per cell)
/// ```
#[derive(Module, Debug)]
pub struct QNetwork<B: Backend> {
    fc1: Linear<B>,
    fc2: Linear<B>,
    fc3: Linear<B>,
    relu: Relu,
}

#[derive(Config, Debug)]
pub struct QNetworkConfig {
    /// Board cells (n²); both the input and the output width.
    pub cells: usize,
    #[config(default = 256)]
    pub hidden_size: usize,
}

impl QNetworkConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> QNetwork<B> {
        QNetwork {
            fc1: LinearConfig::new(self.cells, self.hidden_size).init(device),
            fc2: LinearConfig::new(self.hidden_size, self.hidden_size).init(device),
            fc3: LinearConfig::new(self.hidden_size, self.cells).init(device),
            relu: Relu::new(),
        }
    }
}

impl<B: Backend> QNetwork<B> {
    /// Forward pass: input [batch, n²] -> output [batch, n²] Q-values.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.relu.forward(self.fc1.forward(input));
        let x = self.relu.forward(self.fc2.forward(x));
        self.fc3.forward(x)
    }
}
