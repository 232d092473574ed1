//! Sine wave oscillator

use core::f64::consts::TAU;

use crate::error::Result;
use crate::node::{finite, BoxedSignal, FrameRate, Node, Sample};

/// A sine oscillator at a fixed frequency.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SineNode {
    rate: FrameRate,
    frequency: f64,
}

impl SineNode {
    /// Fails on a NaN or infinite frequency.
    pub fn new(rate: FrameRate, frequency: f64) -> Result<Self> {
        Ok(Self {
            rate,
            frequency: finite("sine frequency", frequency)?,
        })
    }

    #[inline]
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// The output as a concrete iterator.
    pub fn signal(&self) -> Sine {
        Sine {
            frequency: self.frequency,
            rate: self.rate.as_f64(),
            idx: 0,
        }
    }
}

impl Node for SineNode {
    fn name(&self) -> &'static str {
        "SineNode"
    }

    fn frame_rate(&self) -> Option<FrameRate> {
        Some(self.rate)
    }

    fn produce(&mut self) -> Result<BoxedSignal> {
        Ok(Box::new(self.signal()))
    }
}

/// Output of a [`SineNode`].
///
/// Each sample is computed from the absolute index, so there is no phase
/// accumulator to drift.
#[derive(Clone, Debug)]
pub struct Sine {
    frequency: f64,
    rate: f64,
    idx: u64,
}

impl Iterator for Sine {
    type Item = Sample;

    #[inline]
    fn next(&mut self) -> Option<Sample> {
        let v = (TAU * self.frequency * self.idx as f64 / self.rate).sin();
        self.idx += 1;
        Some(v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}
