//! Metrics.
//!
//! Metrics are evaluation helpers (they do not participate in backprop). Both run
//! one forward pass per row, so they take the network mutably: its activation
//! buffers are overwritten.

use crate::matrix::{Matrix, argmax};
use crate::{Error, Network, Result};

impl Network<'_> {
    /// Squared error summed over output units, averaged over rows.
    ///
    /// Each row holds `input_dim` features followed by `output_dim` targets.
    pub fn cost<S: AsRef<[f32]>>(&mut self, data: &Matrix<S>) -> Result<f32> {
        check_dataset(self, data)?;

        let (input_dim, output_dim) = (self.input_dim(), self.output_dim());
        let mut total = 0.0_f32;
        for idx in 0..data.rows() {
            let row = data.row(idx);
            let y = self.predict(&row[..input_dim]);
            for (&p, &t) in y.iter().zip(&row[input_dim..input_dim + output_dim]) {
                let diff = p - t;
                total += diff * diff;
            }
        }
        Ok(total / data.rows() as f32)
    }

    /// Fraction of rows whose predicted argmax unit equals the target argmax unit.
    pub fn accuracy<S: AsRef<[f32]>>(&mut self, data: &Matrix<S>) -> Result<f32> {
        check_dataset(self, data)?;

        let (input_dim, output_dim) = (self.input_dim(), self.output_dim());
        let mut correct = 0_usize;
        for idx in 0..data.rows() {
            let row = data.row(idx);
            let predicted = argmax(self.predict(&row[..input_dim]));
            let actual = argmax(&row[input_dim..input_dim + output_dim]);
            if predicted == actual {
                correct += 1;
            }
        }
        Ok(correct as f32 / data.rows() as f32)
    }
}

fn check_dataset<S: AsRef<[f32]>>(network: &Network<'_>, data: &Matrix<S>) -> Result<()> {
    if data.rows() == 0 {
        return Err(Error::InvalidData("dataset must not be empty".to_owned()));
    }
    check_columns(network, data.cols())
}

/// Rows must hold at least `input_dim + output_dim` columns.
pub(crate) fn check_columns(network: &Network<'_>, cols: usize) -> Result<()> {
    let needed = network.input_dim() + network.output_dim();
    if cols < needed {
        return Err(Error::InvalidShape(format!(
            "dataset has {cols} columns, network needs {needed} ({} inputs + {} targets)",
            network.input_dim(),
            network.output_dim()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_like() -> Network<'static> {
        // 2 -> 2 with large diagonal weights: output k follows input k.
        let mut net = Network::new_in(None, &[2, 2]).unwrap();
        net.weights_mut(0)
            .as_mut_slice()
            .copy_from_slice(&[10.0, 0.0, 0.0, 10.0]);
        net.biases_mut(0).copy_from_slice(&[-5.0, -5.0]);
        net
    }

    #[test]
    fn accuracy_counts_argmax_matches() {
        let mut net = identity_like();
        let data = Matrix::from_vec(
            4,
            4,
            vec![
                1.0, 0.0, 1.0, 0.0, // right
                0.0, 1.0, 0.0, 1.0, // right
                1.0, 0.0, 0.0, 1.0, // wrong
                0.0, 1.0, 0.0, 1.0, // right
            ],
        )
        .unwrap();
        assert_eq!(net.accuracy(&data).unwrap(), 0.75);
    }

    #[test]
    fn cost_sums_outputs_and_averages_rows() {
        let mut net = Network::new_in(None, &[1, 2]).unwrap();
        // Zero weights: every output is sigmoid(0) = 0.5.
        let data = Matrix::from_vec(2, 3, vec![3.0, 1.0, 0.0, -1.0, 0.5, 0.5]).unwrap();
        // Row 0: 0.25 + 0.25, row 1: 0 + 0.
        assert_eq!(net.cost(&data).unwrap(), 0.25);
    }

    #[test]
    fn metrics_reject_bad_datasets() {
        let mut net = identity_like();
        assert!(matches!(
            net.cost(&Matrix::zeros(0, 4)),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            net.accuracy(&Matrix::zeros(3, 3)),
            Err(Error::InvalidShape(_))
        ));
    }
}
