//! Mixer effect - weighted sum of any number of inputs

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::node::{BoxedSignal, FrameRate, Input, Node, Sample};

/// A mixer that sums weighted inputs together.
///
/// Inputs are appended by [`attach`](Node::attach), each with a weight
/// (default `1.0`). When the output is produced, the weights are rescaled
/// to sum to one if their total exceeds one; quieter mixes pass through
/// untouched.
///
/// [`produce`](Node::produce) moves the attached inputs into the output
/// signal, so wiring must be complete before the mixer is pulled.
pub struct MixNode {
    rate: FrameRate,
    inputs: Vec<BoxedSignal>,
    weights: Vec<f64>,
}

impl MixNode {
    pub const DEFAULT_WEIGHT: f64 = 1.0;

    pub fn new(rate: FrameRate) -> Self {
        Self {
            rate,
            inputs: Vec::new(),
            weights: Vec::new(),
        }
    }

    /// Number of attached inputs.
    #[inline]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Weights of the attached inputs, in attachment order.
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[inline]
    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }
}

/// Rescale `weights` to unity gain if they sum to more than one.
pub fn normalize(weights: &mut [f64]) {
    let total: f64 = weights.iter().sum();
    if total > 1.0 {
        debug!(total, "normalizing mixer weights");
        weights.iter_mut().for_each(|w| *w /= total);
    }
}

impl Node for MixNode {
    fn name(&self) -> &'static str {
        "MixNode"
    }

    fn num_inputs(&self) -> usize {
        // Accept any number of inputs
        usize::MAX
    }

    fn frame_rate(&self) -> Option<FrameRate> {
        Some(self.rate)
    }

    fn attach(&mut self, input: Input) -> Result<()> {
        let (signal, weight) = input.resolve(&*self)?;
        let weight = weight.unwrap_or(Self::DEFAULT_WEIGHT);
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::config(format!(
                "mixer weights must be non-negative, got {weight}"
            )));
        }

        self.inputs.push(signal);
        self.weights.push(weight);
        Ok(())
    }

    fn produce(&mut self) -> Result<BoxedSignal> {
        let inputs = std::mem::take(&mut self.inputs);
        let mut weights = std::mem::take(&mut self.weights);
        trace!(inputs = inputs.len(), "producing mixer");

        normalize(&mut weights);
        Ok(Box::new(Mixed { inputs, weights }))
    }
}

/// Output of a [`MixNode`].
///
/// Pulls one sample from every input per output sample, in attachment
/// order. Ends as soon as any input ends; with no inputs it is silence.
pub struct Mixed {
    inputs: Vec<BoxedSignal>,
    weights: Vec<f64>,
}

impl Iterator for Mixed {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        let mut sum = 0.0;
        for (input, &weight) in self.inputs.iter_mut().zip(self.weights.iter()) {
            sum += weight * input.next()?;
        }
        Some(sum)
    }
}
