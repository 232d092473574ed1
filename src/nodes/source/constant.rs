//! Constant source

use core::iter::{repeat, Repeat};

use crate::error::Result;
use crate::node::{finite, BoxedSignal, Node, Sample};

/// Emits the same value forever.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantNode {
    value: Sample,
}

impl ConstantNode {
    /// Fails on a NaN or infinite value.
    pub fn new(value: Sample) -> Result<Self> {
        Ok(Self {
            value: finite("constant value", value)?,
        })
    }

    #[inline]
    pub fn value(&self) -> Sample {
        self.value
    }

    /// The output as a concrete iterator.
    pub fn signal(&self) -> Repeat<Sample> {
        repeat(self.value)
    }
}

impl Default for ConstantNode {
    fn default() -> Self {
        Self { value: 1.0 }
    }
}

impl Node for ConstantNode {
    fn name(&self) -> &'static str {
        "ConstantNode"
    }

    fn produce(&mut self) -> Result<BoxedSignal> {
        Ok(Box::new(self.signal()))
    }
}
