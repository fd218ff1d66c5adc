//! Fixed-topology dense network.
//!
//! A [`Network`] with widths `[w0, w1, ..., w(L-1)]` owns:
//!
//! - `L-1` weight matrices, layer `i` shaped `(w[i], w[i+1])`
//! - `L-1` bias rows, layer `i` of length `w[i+1]`
//! - `L` activation rows, `activations[0]` being the input buffer
//! - `L` activation kinds: `None` for the input, `Relu` for hidden layers,
//!   `Sigmoid` for the output
//!
//! All of it is carved from one [`Arena`] (or the heap) at construction time and is
//! never reallocated; training mutates it in place.
//!
//! Activations are row vectors, so a layer computes `y = act(x W + b)`.

use rand::Rng;
use tracing::debug;

use crate::arena::{Arena, Block};
use crate::matrix::{self, Matrix, MatrixView, MatrixViewMut, Row};
use crate::{Activation, Error, Result};

#[derive(Debug)]
pub struct Network<'a> {
    pub(crate) widths: Vec<usize>,
    pub(crate) weights: Vec<Matrix<Block<'a>>>,
    pub(crate) biases: Vec<Row<Block<'a>>>,
    pub(crate) activations: Vec<Row<Block<'a>>>,
    pub(crate) kinds: Vec<Activation>,
}

impl<'a> Network<'a> {
    /// Allocate a zeroed network with the given layer widths from `arena`, or from
    /// the heap when `arena` is `None`.
    ///
    /// `widths` includes the input and output widths, so it needs at least 2 entries.
    pub fn new_in(arena: Option<&'a Arena>, widths: &[usize]) -> Result<Self> {
        validate_widths(widths)?;

        let num_layers = widths.len();
        let mut weights = Vec::with_capacity(num_layers - 1);
        let mut biases = Vec::with_capacity(num_layers - 1);
        let mut activations = Vec::with_capacity(num_layers);
        let mut kinds = Vec::with_capacity(num_layers);

        activations.push(Row::new_in(arena, widths[0])?);
        kinds.push(Activation::None);

        for w in widths.windows(2) {
            let (in_dim, out_dim) = (w[0], w[1]);
            weights.push(Matrix::new_in(arena, in_dim, out_dim)?);
            biases.push(Row::new_in(arena, out_dim)?);
            activations.push(Row::new_in(arena, out_dim)?);
            kinds.push(Activation::Relu);
        }
        kinds[num_layers - 1] = Activation::Sigmoid;

        debug!(?widths, in_arena = arena.is_some(), "network allocated");

        Ok(Self {
            widths: widths.to_vec(),
            weights,
            biases,
            activations,
            kinds,
        })
    }

    /// Number of `f32` words a network with `widths` takes from an arena.
    pub fn arena_words(widths: &[usize]) -> usize {
        let input = widths.first().copied().unwrap_or(0);
        input
            + widths
                .windows(2)
                .map(|w| w[0] * w[1] + 2 * w[1])
                .sum::<usize>()
    }

    #[inline]
    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    /// Number of layers including the input layer (`L`).
    #[inline]
    pub fn num_layers(&self) -> usize {
        self.widths.len()
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.widths[0]
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.widths[self.widths.len() - 1]
    }

    /// Total number of weights and biases.
    pub fn param_count(&self) -> usize {
        self.weights.iter().map(|w| w.len()).sum::<usize>()
            + self.biases.iter().map(|b| b.len()).sum::<usize>()
    }

    #[inline]
    pub fn same_shape(&self, other: &Network<'_>) -> bool {
        self.widths == other.widths
    }

    /// Weights between layer `layer` and `layer + 1`.
    #[inline]
    pub fn weights(&self, layer: usize) -> MatrixView<'_> {
        self.weights[layer].view()
    }

    #[inline]
    pub fn weights_mut(&mut self, layer: usize) -> MatrixViewMut<'_> {
        self.weights[layer].view_mut()
    }

    /// Biases feeding layer `layer + 1`.
    #[inline]
    pub fn biases(&self, layer: usize) -> &[f32] {
        self.biases[layer].as_slice()
    }

    #[inline]
    pub fn biases_mut(&mut self, layer: usize) -> &mut [f32] {
        self.biases[layer].as_mut_slice()
    }

    /// Outputs of layer `layer` from the most recent forward pass.
    #[inline]
    pub fn activation(&self, layer: usize) -> &[f32] {
        self.activations[layer].as_slice()
    }

    #[inline]
    pub fn kind(&self, layer: usize) -> Activation {
        self.kinds[layer]
    }

    /// Input buffer; write a sample here before calling [`Network::forward`].
    #[inline]
    pub fn input_mut(&mut self) -> &mut [f32] {
        self.activations[0].as_mut_slice()
    }

    /// Output of the most recent forward pass.
    #[inline]
    pub fn output(&self) -> &[f32] {
        self.activations[self.activations.len() - 1].as_slice()
    }

    /// Fill every weight uniformly from `[min, max)` and zero every bias.
    pub fn randomize_weights<R: Rng + ?Sized>(&mut self, min: f32, max: f32, rng: &mut R) {
        for (w, b) in self.weights.iter_mut().zip(&mut self.biases) {
            w.fill_random(min, max, rng);
            b.fill(0.0);
        }
    }

    /// Zero every weight, bias and activation.
    pub fn zero(&mut self) {
        for w in &mut self.weights {
            w.fill(0.0);
        }
        for b in &mut self.biases {
            b.fill(0.0);
        }
        for a in &mut self.activations {
            a.fill(0.0);
        }
    }

    /// Forward pass for the sample already in [`Network::input_mut`].
    ///
    /// For each layer: `activations[i+1] = kind[i+1](activations[i] * weights[i] + biases[i])`.
    /// The result is left in [`Network::output`].
    pub fn forward(&mut self) {
        for i in 0..self.weights.len() {
            // Borrow the previous output immutably and the current output mutably.
            let (prev, next) = self.activations.split_at_mut(i + 1);
            let mut out = next[0].as_matrix_mut();

            matrix::multiply(&mut out, &prev[i].as_matrix(), &self.weights[i]);
            out.add_elementwise(&self.biases[i].as_matrix());
            out.apply_activation(self.kinds[i + 1]);
        }
    }

    /// Copy `input` into the input buffer, run [`Network::forward`] and return the output.
    ///
    /// Panics if `input.len() != self.input_dim()`.
    pub fn predict(&mut self, input: &[f32]) -> &[f32] {
        assert_eq!(
            input.len(),
            self.input_dim(),
            "input len {} does not match network input_dim {}",
            input.len(),
            self.input_dim()
        );
        self.activations[0].copy_from_slice(input);
        self.forward();
        self.output()
    }
}

fn validate_widths(widths: &[usize]) -> Result<()> {
    if widths.len() < 2 {
        return Err(Error::InvalidConfig(
            "widths must include input and output layers".to_owned(),
        ));
    }
    if widths.contains(&0) {
        return Err(Error::InvalidConfig(
            "all layer widths must be > 0".to_owned(),
        ));
    }
    Ok(())
}
