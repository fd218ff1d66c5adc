//! Activation functions.
//!
//! A dense layer computes a pre-activation value `z = x W + b` and then applies an
//! activation function element-wise: `y = activation(z)`.
//!
//! The network only keeps the post-activation outputs `y`. Backprop therefore
//! needs each derivative expressed in terms of `y`, see [`Activation::derivative`].

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Element-wise activation function, selected per layer.
pub enum Activation {
    Sigmoid,
    Tanh,
    Relu,
    /// Identity; used for the input layer.
    None,
}

impl Activation {
    #[inline]
    pub fn forward(self, x: f32) -> f32 {
        match self {
            Activation::Sigmoid => sigmoid(x),
            Activation::Tanh => x.tanh(),
            Activation::Relu => x.max(0.0),
            Activation::None => x,
        }
    }

    /// Derivative of the activation with respect to its input, expressed in terms
    /// of the post-activation output `y`.
    ///
    /// ReLU reports 1 for `y == 0`: a unit that is clamped to zero still passes
    /// its error back.
    #[inline]
    pub fn derivative(self, y: f32) -> f32 {
        match self {
            Activation::Sigmoid => y * (1.0 - y),
            Activation::Tanh => 1.0 - y * y,
            Activation::Relu => {
                if y >= 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::None => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
            Activation::Relu => "relu",
            Activation::None => "none",
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Activation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sigmoid" => Ok(Activation::Sigmoid),
            "tanh" => Ok(Activation::Tanh),
            "relu" => Ok(Activation::Relu),
            "none" => Ok(Activation::None),
            other => Err(Error::InvalidConfig(format!(
                "unknown activation {other:?}"
            ))),
        }
    }
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    // Numerically stable sigmoid.
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}
