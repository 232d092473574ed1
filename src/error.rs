//! Errors raised while wiring or rendering a graph.

use thiserror::Error;

/// Everything that can go wrong while building or pulling a graph.
///
/// Errors are returned from the call that triggers them (usually
/// [`Node::attach`](crate::Node::attach) or [`DumpNode::dump`](crate::DumpNode::dump)).
/// Nothing inside the graph retries or recovers.
#[derive(Debug, Error)]
pub enum Error {
    /// A value offered as an input cannot produce samples.
    #[error("{node} has no output and is not a signal type")]
    InvalidSignalType { node: &'static str },

    /// An input was supplied to a node without an input slot.
    #[error("{node} accepts no input")]
    UnsupportedOperation { node: &'static str },

    /// A required input slot was never attached.
    #[error("{node} has no input attached")]
    Unconnected { node: &'static str },

    /// Invalid numeric configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The byte sink rejected a write.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }
}

/// Shorthand for results carrying [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
