//! A small feed-forward network trainer built on a bump arena.
//!
//! `arena-mlp` trains a fully connected network (ReLU hidden layers, sigmoid
//! output) with mini-batch gradient descent. Every buffer a network needs, and
//! every gradient network computed during training, is carved from an [`Arena`]:
//! one contiguous region rewound in O(1) with [`Arena::reset`].
//!
//! # Panics vs `Result`
//!
//! - Low-level hot path (panics on misuse): element access, views, [`multiply`],
//!   [`Network::forward`], [`Network::predict`], [`apply_gradients`]. Shape
//!   mismatches are programmer error and panic via `assert!`.
//! - Boundary APIs (checked): [`Network::new_in`], [`compute_gradients`],
//!   [`BatchCursor::step`], [`Network::train`], [`Network::cost`],
//!   [`Network::accuracy`], [`data::load_csv`], [`Arena::try_alloc`]. These return
//!   [`Result`].
//!
//! # Data layout
//!
//! - Scalars are `f32`, matrices are row-major.
//! - A dataset is one matrix of shape `(rows, input_dim + output_dim)`: features
//!   first, targets last.
//! - Layer `i` weights have shape `(widths[i], widths[i+1])`; activations are row
//!   vectors, so a layer computes `y = act(x W + b)`.
//!
//! # Quick start
//!
//! ```rust
//! use arena_mlp::{Arena, Matrix, Network, Shuffle, TrainConfig};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! # fn main() -> arena_mlp::Result<()> {
//! let mut data = Matrix::from_rows(&[
//!     vec![0.0, 0.0, 0.0],
//!     vec![0.1, 0.2, 0.0],
//!     vec![0.9, 0.8, 1.0],
//!     vec![1.0, 1.0, 1.0],
//! ])?;
//!
//! let widths = [2, 8, 1];
//! let model = Arena::with_words(Network::arena_words(&widths));
//! let mut scratch = Arena::with_words(Network::arena_words(&widths));
//!
//! let mut net = Network::new_in(Some(&model), &widths)?;
//! net.randomize_weights(-1.0, 1.0, &mut StdRng::seed_from_u64(0));
//!
//! let report = net.train(
//!     &mut scratch,
//!     &mut data,
//!     &TrainConfig {
//!         epochs: 50,
//!         batch_size: 2,
//!         learning_rate: 0.5,
//!         shuffle: Shuffle::Seeded(0),
//!     },
//! )?;
//! assert_eq!(report.epochs.len(), 50);
//! # Ok(())
//! # }
//! ```
//!
//! # Driving batches yourself
//!
//! [`Network::train`] is a thin loop over [`BatchCursor::step`]. A custom loop owns
//! the scratch arena and resets it after each step:
//!
//! ```rust
//! use arena_mlp::{Arena, Matrix, Network, apply_gradients, compute_gradients};
//!
//! # fn main() -> arena_mlp::Result<()> {
//! let batch = Matrix::from_vec(1, 3, vec![0.1, -0.2, 1.0])?;
//! let mut net = Network::new_in(None, &[2, 4, 1])?;
//! let mut scratch = Arena::with_words(Network::arena_words(net.widths()));
//!
//! let grads = compute_gradients(&scratch, &mut net, &batch)?;
//! apply_gradients(&mut net, &grads, 0.1);
//! drop(grads);
//! scratch.reset();
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod arena;
pub mod backprop;
pub mod batch;
pub mod data;
pub mod error;
pub(crate) mod matmul;
pub mod matrix;
pub mod metrics;
pub mod network;
pub mod train;

pub use activation::Activation;
pub use arena::{Arena, Block, allocate};
pub use backprop::{apply_gradients, compute_gradients};
pub use batch::{BatchCursor, StepReport};
pub use data::{load_csv, load_csv_file, train_test_split};
pub use error::{Error, Result};
pub use matrix::{Matrix, MatrixView, MatrixViewMut, Row, RowView, RowViewMut, argmax, multiply};
pub use network::Network;
pub use train::{EpochReport, Shuffle, TrainConfig, TrainReport};
