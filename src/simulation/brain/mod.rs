//! Controller network for the snakes.
//!
//! A fixed two-layer perceptron: `hidden = relu(x · W1 + b1)`,
//! `output = hidden · W2 + b2`. The output layer has no activation; the
//! decision is the arg-max over the outputs.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;

use super::direction::Turn;
use super::fitness::Controller;
use super::persistence::GenomeStore;
use crate::error::{Error, Result};

pub mod genome;

pub use genome::{Genome, Topology};

/// Result of [`NeuralNetwork::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The stored genome replaced the current weights.
    Loaded,
    /// Nothing was stored under the key; the current weights are unchanged.
    NotFound,
}

/// A perceptron whose layer sizes are fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNetwork {
    topology: Topology,
    genome: Genome,
}

impl NeuralNetwork {
    /// Creates a network with Gaussian weights scaled by `scale` and zero biases.
    pub fn new<R: Rng + ?Sized>(topology: Topology, scale: f32, rng: &mut R) -> Self {
        Self {
            topology,
            genome: Genome::random(&topology, scale, rng),
        }
    }

    /// Wraps an existing genome, which must match `topology`.
    pub fn from_genome(topology: Topology, genome: Genome) -> Result<Self> {
        genome.check_shapes(&topology)?;
        Ok(Self { topology, genome })
    }

    /// Layer sizes.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Current weights.
    pub fn weights(&self) -> &Genome {
        &self.genome
    }

    /// Replaces all four tensors; rejects any shape change.
    pub fn set_weights(&mut self, genome: Genome) -> Result<()> {
        genome.check_shapes(&self.topology)?;
        self.genome = genome;
        Ok(())
    }

    /// Consumes the network, returning its genome.
    pub fn into_genome(self) -> Genome {
        self.genome
    }

    /// Runs a batch of input rows through the network.
    ///
    /// `inputs` is `n × inputs`; the result is `n × outputs`.
    pub fn forward(&self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        if inputs.ncols() != self.topology.inputs {
            return Err(Error::ShapeMismatch {
                tensor: "inputs",
                expected: (inputs.nrows(), self.topology.inputs),
                found: inputs.dim(),
            });
        }
        let mut hidden = inputs.dot(&self.genome.w1) + &self.genome.b1;
        hidden.mapv_inplace(|x| x.max(0.0));
        Ok(hidden.dot(&self.genome.w2) + &self.genome.b2)
    }

    /// Stores the weights under `key`.
    pub fn save<S: GenomeStore + ?Sized>(&self, store: &S, key: &str) -> Result<()> {
        store.save(key, &self.genome)
    }

    /// Restores weights stored under `key`.
    ///
    /// A missing key is reported as [`LoadOutcome::NotFound`] and leaves the
    /// weights as they are. Stored data that does not fit this network is an error.
    pub fn load<S: GenomeStore + ?Sized>(&mut self, store: &S, key: &str) -> Result<LoadOutcome> {
        match store.load(key, &self.topology)? {
            Some(genome) => {
                self.set_weights(genome)?;
                Ok(LoadOutcome::Loaded)
            }
            None => Ok(LoadOutcome::NotFound),
        }
    }
}

/// Index of the largest value; the first one wins ties.
pub fn argmax(values: ArrayView1<f32>) -> usize {
    let mut best = 0;
    for (i, &value) in values.iter().enumerate() {
        if value > values[best] {
            best = i;
        }
    }
    best
}

impl Controller for NeuralNetwork {
    fn decide(&self, sensors: ArrayView1<f32>) -> Result<Turn> {
        let outputs = self.forward(sensors.insert_axis(Axis(0)))?;
        let index = argmax(outputs.row(0));
        Turn::from_index(index).ok_or(Error::ShapeMismatch {
            tensor: "outputs",
            expected: (1, 3),
            found: outputs.dim(),
        })
    }
}
