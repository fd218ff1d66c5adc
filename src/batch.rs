//! Incremental mini-batch stepping through one epoch.
//!
//! A [`BatchCursor`] walks a training matrix batch by batch. Each call to
//! [`BatchCursor::step`] computes gradients for the next batch, applies them, and
//! records the batch cost. Once the last row has been consumed the cursor is
//! "epoch done"; the next `step` starts a new epoch from row 0.
//!
//! The cursor never resets the scratch arena. Reset it after every step:
//!
//! ```rust
//! use arena_mlp::{Arena, BatchCursor, Matrix, Network};
//!
//! # fn main() -> arena_mlp::Result<()> {
//! let data = Matrix::from_vec(3, 2, vec![0.0, 0.0, 0.5, 1.0, 1.0, 1.0])?;
//! let mut net = Network::new_in(None, &[1, 1])?;
//! let mut scratch = Arena::with_words(Network::arena_words(&[1, 1]));
//!
//! let mut cursor = BatchCursor::new();
//! while !cursor.is_epoch_done() {
//!     cursor.step(&scratch, &mut net, &data, 2, 0.5)?;
//!     scratch.reset();
//! }
//! assert_eq!(cursor.batches(), 2);
//! # Ok(())
//! # }
//! ```

use tracing::trace;

use crate::arena::Arena;
use crate::backprop::{apply_gradients, compute_gradients};
use crate::matrix::Matrix;
use crate::metrics::check_columns;
use crate::{Error, Network, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatchCursor {
    offset: usize,
    accumulated_loss: f32,
    epoch_done: bool,
    batches: usize,
}

/// Outcome of a single [`BatchCursor::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// First row of the batch.
    pub start: usize,
    /// Number of rows in the batch.
    pub rows: usize,
    /// Cost of the updated network over the batch.
    pub cost: f32,
}

impl BatchCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next row to be processed.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Sum of batch costs so far; the mean batch cost once the epoch is done.
    #[inline]
    pub fn accumulated_loss(&self) -> f32 {
        self.accumulated_loss
    }

    #[inline]
    pub fn is_epoch_done(&self) -> bool {
        self.epoch_done
    }

    /// Steps taken in the current epoch.
    #[inline]
    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Train on the next batch of `data`.
    ///
    /// The batch is rows `[offset, offset + min(batch_size, rows - offset))`.
    /// Gradients are computed in `scratch` and applied to `network` with
    /// `learning_rate`. When the last row is consumed, the accumulated loss is
    /// divided by `ceil(rows / batch_size)` and the epoch is marked done.
    pub fn step<S: AsRef<[f32]>>(
        &mut self,
        scratch: &Arena,
        network: &mut Network<'_>,
        data: &Matrix<S>,
        batch_size: usize,
        learning_rate: f32,
    ) -> Result<StepReport> {
        if batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be > 0".to_owned()));
        }
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(Error::InvalidConfig(
                "learning rate must be finite and > 0".to_owned(),
            ));
        }
        let total = data.rows();
        if total == 0 {
            return Err(Error::InvalidData(
                "training data must not be empty".to_owned(),
            ));
        }
        check_columns(network, data.cols())?;

        if self.epoch_done {
            *self = Self::default();
        }
        if self.offset >= total {
            // The data shrank under a cursor left mid-epoch.
            return Err(Error::InvalidData(format!(
                "cursor offset {} is past the end of {total} rows",
                self.offset
            )));
        }

        let start = self.offset;
        let rows = batch_size.min(total - start);
        let batch = data.row_slice(start, rows);

        let grads = compute_gradients(scratch, network, &batch)?;
        apply_gradients(network, &grads, learning_rate);
        let cost = network.cost(&batch)?;

        self.accumulated_loss += cost;
        self.offset += rows;
        self.batches += 1;

        if self.offset >= total {
            let batch_count = total.div_ceil(batch_size);
            self.accumulated_loss /= batch_count as f32;
            self.epoch_done = true;
        }

        trace!(start, rows, cost, epoch_done = self.epoch_done, "batch step");
        Ok(StepReport { start, rows, cost })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn toy_data(rows: usize) -> Matrix {
        let mut data = Vec::with_capacity(rows * 3);
        for r in 0..rows {
            let x = r as f32 / rows as f32;
            data.extend_from_slice(&[x, 1.0 - x, if x > 0.5 { 1.0 } else { 0.0 }]);
        }
        Matrix::from_vec(rows, 3, data).unwrap()
    }

    #[test]
    fn last_batch_is_short() {
        let widths = [2, 3, 1];
        let mut rng = StdRng::seed_from_u64(5);
        let mut net = Network::new_in(None, &widths).unwrap();
        net.randomize_weights(-1.0, 1.0, &mut rng);
        let mut scratch = Arena::with_words(Network::arena_words(&widths));
        let data = toy_data(7);

        let mut cursor = BatchCursor::new();
        let mut sizes = Vec::new();
        while !cursor.is_epoch_done() {
            sizes.push(cursor.step(&scratch, &mut net, &data, 3, 0.1).unwrap().rows);
            scratch.reset();
        }
        assert_eq!(sizes, vec![3, 3, 1]);
        assert_eq!(cursor.offset(), 7);
    }

    #[test]
    fn dataset_smaller_than_one_batch_is_a_single_step() {
        let widths = [2, 1];
        let mut net = Network::new_in(None, &widths).unwrap();
        let scratch = Arena::with_words(Network::arena_words(&widths));
        let data = toy_data(2);

        let mut cursor = BatchCursor::new();
        let report = cursor.step(&scratch, &mut net, &data, 32, 0.1).unwrap();
        assert_eq!(report.rows, 2);
        assert!(cursor.is_epoch_done());
        assert_eq!(cursor.accumulated_loss(), report.cost);
    }

    #[test]
    fn finished_cursor_restarts_lazily() {
        let widths = [2, 1];
        let mut net = Network::new_in(None, &widths).unwrap();
        let mut scratch = Arena::with_words(Network::arena_words(&widths));
        let data = toy_data(4);

        let mut cursor = BatchCursor::new();
        cursor.step(&scratch, &mut net, &data, 4, 0.1).unwrap();
        scratch.reset();
        assert!(cursor.is_epoch_done());

        let report = cursor.step(&scratch, &mut net, &data, 3, 0.1).unwrap();
        assert_eq!(report.start, 0);
        assert_eq!(cursor.offset(), 3);
        assert_eq!(cursor.batches(), 1);
        assert!(!cursor.is_epoch_done());
        assert_eq!(cursor.accumulated_loss(), report.cost);
    }

    #[test]
    fn rejects_bad_preconditions() {
        let widths = [2, 1];
        let mut net = Network::new_in(None, &widths).unwrap();
        let scratch = Arena::with_words(Network::arena_words(&widths));
        let mut cursor = BatchCursor::new();

        assert!(matches!(
            cursor.step(&scratch, &mut net, &toy_data(4), 0, 0.1),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            cursor.step(&scratch, &mut net, &toy_data(4), 2, f32::NAN),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            cursor.step(&scratch, &mut net, &Matrix::zeros(0, 3), 2, 0.1),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            cursor.step(&scratch, &mut net, &Matrix::zeros(4, 2), 2, 0.1),
            Err(Error::InvalidShape(_))
        ));
        assert_eq!(cursor, BatchCursor::new());
    }
}
