//! Graph composition helpers

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::trace;

use crate::error::Result;
use crate::node::{BoxedSignal, FrameRate, Input, Node, Sample, Signal};
use crate::nodes::{MixNode, SineNode};

/// A mixer fed by the first `count` harmonics of `fundamental`.
///
/// Harmonic `h` (1-based) is a [`SineNode`] at `fundamental * h`, attached
/// with the default weight, so any chord of two or more harmonics is
/// normalized to `1 / count` per partial. Fails if a harmonic's frequency
/// is not finite.
///
/// ```
/// use tongraph::{harmony, FrameRate};
///
/// let mixer = harmony(FrameRate::DEFAULT, 440.0, 3).unwrap();
/// assert_eq!(mixer.len(), 3);
/// ```
pub fn harmony(rate: FrameRate, fundamental: f64, count: usize) -> Result<MixNode> {
    let mut mixer = MixNode::new(rate);
    for h in 1..=count {
        mixer.attach(Input::node(SineNode::new(rate, fundamental * h as f64)?))?;
    }
    trace!(fundamental, count, "built harmony");
    Ok(mixer)
}

struct TeeState {
    upstream: BoxedSignal,
    /// Samples pulled from upstream that some branch has not read yet.
    buffer: VecDeque<Sample>,
    /// Absolute index of `buffer[0]`.
    offset: u64,
    /// Next absolute index per branch; `None` once the branch is dropped.
    cursors: Vec<Option<u64>>,
}

impl TeeState {
    fn trim(&mut self) {
        let slowest = self.cursors.iter().flatten().min().copied();
        let keep_from = slowest.unwrap_or(self.offset + self.buffer.len() as u64);
        while self.offset < keep_from && self.buffer.pop_front().is_some() {
            self.offset += 1;
        }
    }
}

/// Split one signal into `branches` independent copies.
///
/// Each upstream sample is pulled once and buffered until every live branch
/// has read it, so branches may be pulled at different paces. Memory grows
/// with the distance between the fastest and slowest live branch.
///
/// ```
/// use tongraph::tee;
///
/// let mut branches = tee((0..).map(|i| i as f64), 2);
/// let b = branches.pop().unwrap();
/// let a = branches.pop().unwrap();
/// let a: Vec<f64> = a.take(3).collect();
/// let b: Vec<f64> = b.take(3).collect();
/// assert_eq!(a, b);
/// ```
pub fn tee<S: Signal + 'static>(signal: S, branches: usize) -> Vec<TeeBranch> {
    let state = Rc::new(RefCell::new(TeeState {
        upstream: Box::new(signal),
        buffer: VecDeque::new(),
        offset: 0,
        cursors: vec![Some(0); branches],
    }));

    (0..branches)
        .map(|id| TeeBranch {
            state: Rc::clone(&state),
            id,
        })
        .collect()
}

/// One output of [`tee`].
pub struct TeeBranch {
    state: Rc<RefCell<TeeState>>,
    id: usize,
}

impl Iterator for TeeBranch {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;

        let pos = state.cursors[self.id]?;
        let rel = (pos - state.offset) as usize;
        let v = match state.buffer.get(rel) {
            Some(&v) => v,
            None => {
                let v = state.upstream.next()?;
                state.buffer.push_back(v);
                v
            }
        };

        state.cursors[self.id] = Some(pos + 1);
        state.trim();
        Some(v)
    }
}

impl Drop for TeeBranch {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.cursors[self.id] = None;
            state.trim();
        }
    }
}
