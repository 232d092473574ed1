//! Core node trait and wiring types.

use core::fmt;

use tracing::debug;

use crate::error::{Error, Result};

/// One sample of audio.
pub type Sample = f64;

/// A lazily produced, single-pass sequence of samples.
///
/// Every iterator over [`Sample`] is a signal, so plain iterators such as
/// `std::iter::repeat(0.5)` can be wired into a graph next to node outputs.
/// A signal owns its position: pulling from it advances it for everyone
/// holding it, so connecting one output to two consumers needs a
/// [`tee`](crate::tee).
pub trait Signal: Iterator<Item = Sample> {}

impl<I: Iterator<Item = Sample> + ?Sized> Signal for I {}

/// Owned wire between two nodes.
pub type BoxedSignal = Box<dyn Signal>;

/// Samples per second shared by every node of a graph.
///
/// Nodes only interoperate when they are built against the same rate; node
/// inputs built against a different rate are rejected when attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRate(u32);

impl FrameRate {
    /// Rate used when none is given.
    pub const DEFAULT: FrameRate = FrameRate(192_000);

    /// Validates a frame rate, rejecting zero.
    pub fn new(hz: u32) -> Result<Self> {
        if hz == 0 {
            return Err(Error::config("frame rate must be positive"));
        }
        Ok(FrameRate(hz))
    }

    #[inline]
    pub fn hz(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }

    /// Number of whole frames in `seconds` of modeled time.
    ///
    /// Negative and non-finite durations are configuration errors.
    pub fn frames_in(self, seconds: f64) -> Result<usize> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(Error::config(format!(
                "duration must be a non-negative number of seconds, got {seconds}"
            )));
        }
        Ok((seconds * self.as_f64()).floor() as usize)
    }
}

/// Rejects NaN and infinite node parameters.
pub(crate) fn finite(what: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(Error::config(format!("{what} must be finite, got {value}")));
    }
    Ok(value)
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.0)
    }
}

/// Where an input's samples come from.
pub enum Source {
    /// An already produced signal.
    Signal(BoxedSignal),
    /// A node whose output is produced when the input is attached.
    Node(Box<dyn Node>),
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Signal(_) => f.write_str("Source::Signal(<signal>)"),
            Source::Node(node) => write!(f, "Source::Node({})", node.name()),
        }
    }
}

/// A value ready to be attached to a node's input slot.
///
/// Only [`MixNode`](crate::MixNode) inputs carry a weight; the other nodes
/// reject weighted inputs.
///
/// ```
/// use tongraph::{FrameRate, Input, MixNode, Node, SineNode};
///
/// let rate = FrameRate::DEFAULT;
/// let mut mixer = MixNode::new(rate);
/// mixer.attach(Input::node(SineNode::new(rate, 440.0)?))?;
/// mixer.attach(Input::signal(std::iter::repeat(0.1)).with_weight(0.5))?;
/// assert_eq!(mixer.len(), 2);
/// # Ok::<(), tongraph::Error>(())
/// ```
#[derive(Debug)]
pub struct Input {
    pub source: Source,
    pub weight: Option<f64>,
}

impl Input {
    /// Wire an existing signal.
    pub fn signal<S: Signal + 'static>(signal: S) -> Self {
        Self {
            source: Source::Signal(Box::new(signal)),
            weight: None,
        }
    }

    /// Wire a node; its output is produced when the input is attached.
    pub fn node<N: Node + 'static>(node: N) -> Self {
        Self {
            source: Source::Node(Box::new(node)),
            weight: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Turn the source into a signal on behalf of `receiver`.
    ///
    /// Returns the signal and the (unvalidated) weight.
    pub(crate) fn resolve(self, receiver: &dyn Node) -> Result<(BoxedSignal, Option<f64>)> {
        let signal = match self.source {
            Source::Signal(signal) => signal,
            Source::Node(mut node) => {
                if node.num_outputs() == 0 {
                    return Err(Error::InvalidSignalType { node: node.name() });
                }
                if let (Some(ours), Some(theirs)) = (receiver.frame_rate(), node.frame_rate()) {
                    if ours != theirs {
                        return Err(Error::config(format!(
                            "{} runs at {} but its input {} runs at {}",
                            receiver.name(),
                            ours,
                            node.name(),
                            theirs
                        )));
                    }
                }
                node.produce()?
            }
        };
        Ok((signal, self.weight))
    }

    /// Resolve an input bound for a single, unweighted slot.
    pub(crate) fn resolve_unweighted(self, receiver: &dyn Node) -> Result<BoxedSignal> {
        let (signal, weight) = self.resolve(receiver)?;
        if let Some(weight) = weight {
            return Err(Error::config(format!(
                "{} input does not take a weight (got {weight})",
                receiver.name()
            )));
        }
        Ok(signal)
    }
}

impl From<BoxedSignal> for Input {
    fn from(signal: BoxedSignal) -> Self {
        Self {
            source: Source::Signal(signal),
            weight: None,
        }
    }
}

/// Store `signal` in a single-input slot, replacing whatever was there.
pub(crate) fn fill_slot(slot: &mut Option<BoxedSignal>, signal: BoxedSignal, node: &'static str) {
    if slot.replace(signal).is_some() {
        debug!(node, "replacing previously attached input");
    }
}

/// The core trait for graph nodes.
///
/// Nodes can be:
/// - **Sources**: no inputs, one output - [`ConstantNode`](crate::ConstantNode), [`SineNode`](crate::SineNode)
/// - **Effects**: inputs and one output - [`ModNode`](crate::ModNode), [`MixNode`](crate::MixNode)
/// - **Sinks**: one input, no output - [`DumpNode`](crate::DumpNode)
///
/// Wiring happens through [`attach`](Node::attach); the output is taken with
/// [`produce`](Node::produce). Evaluation is lazy: nothing is computed until
/// the produced signal is pulled.
///
/// # Custom nodes
///
/// ```
/// use tongraph::{BoxedSignal, Node, Result};
///
/// /// Alternates between -1 and 1.
/// struct Flip;
///
/// impl Node for Flip {
///     fn name(&self) -> &'static str { "Flip" }
///
///     fn produce(&mut self) -> Result<BoxedSignal> {
///         Ok(Box::new((0..).map(|i| if i % 2 == 0 { -1.0 } else { 1.0 })))
///     }
/// }
///
/// let samples: Vec<f64> = Flip.produce().unwrap().take(3).collect();
/// assert_eq!(samples, vec![-1.0, 1.0, -1.0]);
/// ```
pub trait Node {
    /// Human-readable node kind, used in errors and logs.
    fn name(&self) -> &'static str;

    /// Number of input slots (0 for sources, `usize::MAX` for unbounded).
    fn num_inputs(&self) -> usize {
        0
    }

    /// Number of outputs (0 for sinks).
    fn num_outputs(&self) -> usize {
        1
    }

    /// Frame rate the node was built against, if it depends on one.
    fn frame_rate(&self) -> Option<FrameRate> {
        None
    }

    /// Connect an upstream signal to this node.
    fn attach(&mut self, _input: Input) -> Result<()> {
        Err(Error::UnsupportedOperation { node: self.name() })
    }

    /// Produce this node's output signal.
    fn produce(&mut self) -> Result<BoxedSignal>;

    /// Attach `input`, then produce.
    fn feed(&mut self, input: Input) -> Result<BoxedSignal> {
        self.attach(input)?;
        self.produce()
    }
}

impl<N: Node + ?Sized> Node for Box<N> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn num_inputs(&self) -> usize {
        (**self).num_inputs()
    }

    fn num_outputs(&self) -> usize {
        (**self).num_outputs()
    }

    fn frame_rate(&self) -> Option<FrameRate> {
        (**self).frame_rate()
    }

    fn attach(&mut self, input: Input) -> Result<()> {
        (**self).attach(input)
    }

    fn produce(&mut self) -> Result<BoxedSignal> {
        (**self).produce()
    }
}
