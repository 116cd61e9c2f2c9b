use burn::prelude::*;
use burn::tensor::TensorData;

use crate::game::{Board, Cell};

/// Value seen for any cell the player cannot read: hidden, flagged, or a mine
/// that has not gone off.
pub const UNKNOWN: f32 = -1.0;

/// Value seen for an exploded mine (only present in terminal observations).
pub const EXPLODED: f32 = -2.0;

/// Flatten the board into one value per cell, row-major.
///
/// `Revealed(k)` maps to `k`; everything the player cannot see maps to
/// [`UNKNOWN`], so hidden mines are indistinguishable from safe cells.
pub fn encode_observation(board: &Board) -> Vec<f32> {
    board
        .cells()
        .iter()
        .map(|&cell| match cell {
            Cell::Revealed(k) => k as f32,
            Cell::MineExploded => EXPLODED,
            _ => UNKNOWN,
        })
        .collect()
}

/// Stack observations into a `[batch, cells]` tensor.
///
/// Panics if any observation does not have exactly `cells` entries.
pub fn observations_batch<B: Backend>(
    observations: &[&[f32]],
    cells: usize,
    device: &B::Device,
) -> Tensor<B, 2> {
    let batch_size = observations.len();
    let mut flat = Vec::with_capacity(batch_size * cells);
    for obs in observations {
        assert_eq!(
            obs.len(),
            cells,
            "observation length mismatch: got {}, expected {}",
            obs.len(),
            cells
        );
        flat.extend_from_slice(obs);
    }
    Tensor::<B, 1>::from_data(TensorData::from(flat.as_slice()), device)
        .reshape([batch_size as i32, cells as i32])
}
