//! Gradient computation and parameter update.
//!
//! Gradients are accumulated into a second [`Network`] of identical shape, carved
//! from a scratch arena. Its weights and biases hold the batch-mean gradients; its
//! activation rows are reused as per-sample error buffers (`dC/dy` per layer).
//!
//! The live network is only read during accumulation, so every sample in a batch
//! sees the same pre-update weights. Parameters change only in [`apply_gradients`].
//!
//! The cost being differentiated is `0.5 * sum((y - target)^2)` per sample, which
//! makes the output error simply `y - target`.

use tracing::trace;

use crate::arena::Arena;
use crate::matrix::Matrix;
use crate::metrics::check_columns;
use crate::{Error, Network, Result};

/// Compute batch-mean gradients of `network` over every row of `batch`.
///
/// Each row holds `input_dim` features followed by `output_dim` targets; extra
/// trailing columns are ignored. The returned network lives in `scratch`; the
/// caller decides when to reset it.
///
/// `network`'s activation buffers are overwritten (one forward pass per sample);
/// its weights and biases are left untouched.
pub fn compute_gradients<'s, S: AsRef<[f32]>>(
    scratch: &'s Arena,
    network: &mut Network<'_>,
    batch: &Matrix<S>,
) -> Result<Network<'s>> {
    let samples = batch.rows();
    if samples == 0 {
        return Err(Error::InvalidData("batch must not be empty".to_owned()));
    }
    check_columns(network, batch.cols())?;

    let mut grads = Network::new_in(Some(scratch), &network.widths)?;
    grads.zero();

    let input_dim = network.input_dim();
    let output_dim = network.output_dim();
    let last = network.num_layers() - 1;

    for idx in 0..samples {
        let sample = batch.row(idx);
        let input = &sample[..input_dim];
        let target = &sample[input_dim..input_dim + output_dim];

        network.predict(input);

        for err in &mut grads.activations {
            err.fill(0.0);
        }

        let out_err = grads.activations[last].as_mut_slice();
        for ((e, &y), &t) in out_err.iter_mut().zip(network.output()).zip(target) {
            *e = y - t;
        }

        for layer in (1..=last).rev() {
            // Error of the current layer (read) and of the previous layer (accumulated).
            let (before, after) = grads.activations.split_at_mut(layer);
            let prev_err = before[layer - 1].as_mut_slice();
            let cur_err = after[0].as_slice();

            let current = network.activations[layer].as_slice();
            let previous = network.activations[layer - 1].as_slice();
            let kind = network.kinds[layer];

            let weights = &network.weights[layer - 1];
            let cols = weights.cols();
            let w = weights.as_slice();
            let dw = grads.weights[layer - 1].as_mut_slice();
            let db = grads.biases[layer - 1].as_mut_slice();

            for j in 0..current.len() {
                let delta = cur_err[j] * kind.derivative(current[j]);
                db[j] += delta;
                for p in 0..previous.len() {
                    dw[p * cols + j] += delta * previous[p];
                    prev_err[p] += delta * w[p * cols + j];
                }
            }
        }
    }

    let n = samples as f32;
    for (dw, db) in grads.weights.iter_mut().zip(&mut grads.biases) {
        for g in dw.as_mut_slice() {
            *g /= n;
        }
        for g in db.as_mut_slice() {
            *g /= n;
        }
    }

    trace!(samples, scratch_used = scratch.used(), "gradients computed");
    Ok(grads)
}

/// Plain gradient descent: `param -= learning_rate * grad` for every weight and bias.
///
/// Panics if the shapes differ. The learning rate is applied as given; range
/// checks belong to [`crate::BatchCursor::step`] and [`crate::TrainConfig::validate`].
pub fn apply_gradients(network: &mut Network<'_>, grads: &Network<'_>, learning_rate: f32) {
    debug_assert!(learning_rate.is_finite(), "learning rate must be finite");
    assert!(
        network.same_shape(grads),
        "gradient widths {:?} do not match network widths {:?}",
        grads.widths,
        network.widths
    );

    for (w, dw) in network.weights.iter_mut().zip(&grads.weights) {
        for (p, &g) in w.as_mut_slice().iter_mut().zip(dw.as_slice()) {
            *p -= learning_rate * g;
        }
    }
    for (b, db) in network.biases.iter_mut().zip(&grads.biases) {
        for (p, &g) in b.as_mut_slice().iter_mut().zip(db.as_slice()) {
            *p -= learning_rate * g;
        }
    }
}
