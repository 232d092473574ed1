//! A small pull-based audio signal graph.
//!
//! Nodes are wired together by attaching one node's output to another
//! node's input. Nothing is computed until a [`DumpNode`] pulls samples
//! through the graph, one sample per input per output sample, and renders
//! them as raw little-endian PCM frames.
//!
//! ```
//! use tongraph::{harmony, DumpNode, Encoding, FrameRate, Input, ModNode, Node};
//!
//! let rate = FrameRate::new(48_000)?;
//! let mut modulator = ModNode::new(rate, 4.0)?;
//! modulator.attach(Input::node(harmony(rate, 640.0, 2)?))?;
//!
//! let mut out = DumpNode::new(rate, Encoding::int16())?;
//! out.attach(Input::node(modulator))?;
//!
//! let mut pcm = Vec::<u8>::new();
//! let frames = out.dump(&mut pcm, 0.5)?;
//! assert_eq!(frames, 24_000);
//! assert_eq!(pcm.len(), 48_000);
//! # Ok::<(), tongraph::Error>(())
//! ```

mod error;
mod graph;
mod node;
pub mod nodes;

pub use error::{Error, Result};
pub use graph::{harmony, tee, TeeBranch};
pub use node::{BoxedSignal, FrameRate, Input, Node, Sample, Signal, Source};
pub use nodes::{
    ConstantNode, DumpNode, Encoding, Frame, MixNode, Mixed, ModNode, Modulated, Modulation, Sine,
    SineNode,
};
