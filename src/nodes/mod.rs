//! Built-in graph nodes.
//!
//! Nodes are organized into three categories:
//!
//! ## Sources ([`source`])
//!
//! Generate samples with no inputs:
//! - [`ConstantNode`] - A fixed value, forever
//! - [`SineNode`] - Sine oscillator at a fixed frequency
//!
//! ## Effects ([`effect`])
//!
//! Transform inputs into a new signal:
//! - [`ModNode`] - Frequency modulation of a cosine carrier
//! - [`MixNode`] - Weighted sum of any number of inputs
//!
//! ## Sinks ([`sink`])
//!
//! Consume samples with no output:
//! - [`DumpNode`] - Render to raw PCM frames
//!
//! Every node also hands out its output as a concrete iterator type
//! ([`Sine`], [`Modulated`], [`Mixed`]) for callers that want to avoid boxing.

pub mod source;
pub mod effect;
pub mod sink;

// Re-export common types at the top level for convenience
pub use source::{ConstantNode, Sine, SineNode};
pub use effect::{Mixed, MixNode, ModNode, Modulated, Modulation};
pub use sink::{DumpNode, Encoding, Frame};
