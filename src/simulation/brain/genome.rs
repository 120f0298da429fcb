//! The genome: the four parameter tensors of a controller network, plus the
//! genetic operators that act on them.

use ndarray::Array2;
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::StandardNormal;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tensor names in storage order.
pub const TENSOR_NAMES: [&str; 4] = ["w1", "b1", "w2", "b2"];

/// Layer sizes of the two-layer perceptron.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// Input neurons (sensor vector length).
    pub inputs: usize,
    /// Hidden ReLU neurons.
    pub hidden: usize,
    /// Output neurons (one per decision).
    pub outputs: usize,
}

impl Default for Topology {
    fn default() -> Self {
        Self {
            inputs: 11,
            hidden: 16,
            outputs: 3,
        }
    }
}

impl Topology {
    /// Shapes of `w1`, `b1`, `w2`, `b2` in that order.
    pub fn shapes(&self) -> [(usize, usize); 4] {
        [
            (self.inputs, self.hidden),
            (1, self.hidden),
            (self.hidden, self.outputs),
            (1, self.outputs),
        ]
    }

    /// Total number of scalar parameters.
    pub fn parameter_count(&self) -> usize {
        self.shapes().iter().map(|(r, c)| r * c).sum()
    }
}

/// Weights and biases of one controller.
///
/// Every genome owns its tensors; cloning or breeding always copies, so a
/// child never shares storage with a parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    /// Input → hidden weights (`inputs × hidden`).
    pub w1: Array2<f32>,
    /// Hidden bias (`1 × hidden`).
    pub b1: Array2<f32>,
    /// Hidden → output weights (`hidden × outputs`).
    pub w2: Array2<f32>,
    /// Output bias (`1 × outputs`).
    pub b2: Array2<f32>,
}

impl Genome {
    /// Gaussian weights scaled by `scale`, zero biases.
    pub fn random<R: Rng + ?Sized>(topology: &Topology, scale: f32, rng: &mut R) -> Self {
        let [w1, b1, w2, b2] = topology.shapes();
        Self {
            w1: Array2::random_using(w1, StandardNormal, rng) * scale,
            b1: Array2::zeros(b1),
            w2: Array2::random_using(w2, StandardNormal, rng) * scale,
            b2: Array2::zeros(b2),
        }
    }

    /// Builds a genome from tensors in storage order, checking them against `topology`.
    pub fn from_tensors(tensors: Vec<Array2<f32>>, topology: &Topology) -> Result<Self> {
        let found = tensors.len();
        let [w1, b1, w2, b2]: [Array2<f32>; 4] =
            tensors.try_into().map_err(|_| Error::TensorCount { expected: 4, found })?;
        let genome = Self { w1, b1, w2, b2 };
        genome.check_shapes(topology)?;
        Ok(genome)
    }

    /// Tensors in storage order.
    pub fn tensors(&self) -> [&Array2<f32>; 4] {
        [&self.w1, &self.b1, &self.w2, &self.b2]
    }

    /// Mutable tensors in storage order.
    pub fn tensors_mut(&mut self) -> [&mut Array2<f32>; 4] {
        [&mut self.w1, &mut self.b1, &mut self.w2, &mut self.b2]
    }

    /// Fails with [`Error::ShapeMismatch`] on the first tensor whose shape differs from `topology`.
    pub fn check_shapes(&self, topology: &Topology) -> Result<()> {
        for ((tensor, name), expected) in self
            .tensors()
            .into_iter()
            .zip(TENSOR_NAMES)
            .zip(topology.shapes())
        {
            if tensor.dim() != expected {
                return Err(Error::ShapeMismatch {
                    tensor: name,
                    expected,
                    found: tensor.dim(),
                });
            }
        }
        Ok(())
    }

    /// Block-uniform crossover: each tensor is copied whole from one parent,
    /// chosen with probability 0.5, independently per tensor.
    pub fn crossover<R: Rng + ?Sized>(parent1: &Genome, parent2: &Genome, rng: &mut R) -> Self {
        let mut pick = |a: &Array2<f32>, b: &Array2<f32>| {
            if rng.gen_bool(0.5) { a.clone() } else { b.clone() }
        };
        Self {
            w1: pick(&parent1.w1, &parent2.w1),
            b1: pick(&parent1.b1, &parent2.b1),
            w2: pick(&parent1.w2, &parent2.w2),
            b2: pick(&parent1.b2, &parent2.b2),
        }
    }

    /// Adds `N(0, 1) · strength` to each entry independently with probability `rate`.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate: f64, strength: f32, rng: &mut R) {
        for tensor in self.tensors_mut() {
            for value in tensor.iter_mut() {
                if rng.gen_bool(rate) {
                    *value += rng.sample::<f32, _>(StandardNormal) * strength;
                }
            }
        }
    }
}
