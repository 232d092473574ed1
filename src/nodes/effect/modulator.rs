//! Frequency modulator

use core::f64::consts::TAU;

use tracing::trace;

use crate::error::{Error, Result};
use crate::node::{fill_slot, finite, BoxedSignal, FrameRate, Input, Node, Sample};

/// How a [`ModNode`] turns input amplitude into phase deviation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Modulation {
    /// Accumulate the raw input amplitude. Suited to zero-mean modulators.
    #[default]
    Simple,
    /// Subtract a one-pole estimate of the input's DC offset before
    /// accumulating, so a biased modulator does not drift the carrier.
    DcCompensated {
        /// Low-pass coefficient of the DC estimate.
        lpf: f64,
    },
}

impl Modulation {
    pub const DEFAULT_LPF: f64 = 0.1;

    pub fn dc_compensated() -> Self {
        Modulation::DcCompensated {
            lpf: Self::DEFAULT_LPF,
        }
    }
}

/// A cosine carrier whose phase is pushed around by its input.
///
/// Every input sample is added to a running deviation, and the carrier is
/// emitted as `cos(2π·f·i/rate + deviation)`. An input loud enough to
/// overflow the deviation yields NaN samples, which [`DumpNode`](crate::DumpNode)
/// renders as silence.
pub struct ModNode {
    rate: FrameRate,
    frequency: f64,
    modulation: Modulation,
    input: Option<BoxedSignal>,
}

impl ModNode {
    /// Fails on a NaN or infinite carrier frequency.
    pub fn new(rate: FrameRate, frequency: f64) -> Result<Self> {
        Ok(Self {
            rate,
            frequency: finite("carrier frequency", frequency)?,
            modulation: Modulation::default(),
            input: None,
        })
    }

    pub fn with_modulation(mut self, modulation: Modulation) -> Self {
        self.modulation = modulation;
        self
    }

    #[inline]
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    #[inline]
    pub fn modulation(&self) -> Modulation {
        self.modulation
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.input.is_some()
    }
}

impl Node for ModNode {
    fn name(&self) -> &'static str {
        "ModNode"
    }

    fn num_inputs(&self) -> usize {
        1
    }

    fn frame_rate(&self) -> Option<FrameRate> {
        Some(self.rate)
    }

    fn attach(&mut self, input: Input) -> Result<()> {
        let signal = input.resolve_unweighted(&*self)?;
        let name = self.name();
        fill_slot(&mut self.input, signal, name);
        Ok(())
    }

    fn produce(&mut self) -> Result<BoxedSignal> {
        let input = self
            .input
            .take()
            .ok_or(Error::Unconnected { node: self.name() })?;
        trace!(frequency = self.frequency, modulation = ?self.modulation, "producing modulator");
        Ok(Box::new(Modulated::new(
            input,
            self.frequency,
            self.rate,
            self.modulation,
        )))
    }
}

/// Output of a [`ModNode`]; ends when its input ends.
pub struct Modulated<S> {
    input: S,
    frequency: f64,
    rate: f64,
    modulation: Modulation,
    idx: u64,
    deviation: f64,
    dc: f64,
}

impl<S: Iterator<Item = Sample>> Modulated<S> {
    pub fn new(input: S, frequency: f64, rate: FrameRate, modulation: Modulation) -> Self {
        // the DC estimate divides by the index, so it counts from 1
        let idx = match modulation {
            Modulation::Simple => 0,
            Modulation::DcCompensated { .. } => 1,
        };
        Self {
            input,
            frequency,
            rate: rate.as_f64(),
            modulation,
            idx,
            deviation: 0.0,
            dc: 0.0,
        }
    }

    /// Accumulated phase deviation so far.
    #[inline]
    pub fn deviation(&self) -> f64 {
        self.deviation
    }
}

impl<S: Iterator<Item = Sample>> Iterator for Modulated<S> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        let a = self.input.next()?;
        let i = self.idx as f64;

        match self.modulation {
            Modulation::Simple => self.deviation += a,
            Modulation::DcCompensated { lpf } => {
                // the dc/i term fades the correction as the index grows
                self.dc = (1.0 - lpf) * self.dc + lpf * a - self.dc / i;
                self.deviation += a - self.dc;
            }
        }

        let v = (TAU * self.frequency * i / self.rate + self.deviation).cos();
        self.idx += 1;
        Some(v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.input.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::source::{ConstantNode, SineNode};
    use core::iter::repeat;

    fn rate() -> FrameRate {
        FrameRate::new(1000).unwrap()
    }

    #[test]
    fn silent_input_is_plain_carrier() {
        let mut node = ModNode::new(rate(), 50.0).unwrap();
        let samples: Vec<Sample> = node.feed(Input::signal(repeat(0.0))).unwrap().take(64).collect();

        for (i, &actual) in samples.iter().enumerate() {
            let expected = (TAU * 50.0 * i as f64 / 1000.0).cos();
            assert!((actual - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn simple_accumulates_deviation() {
        let mut fm = Modulated::new(repeat(0.5), 0.0, rate(), Modulation::Simple);
        let first = fm.next().unwrap();
        assert!((first - 0.5f64.cos()).abs() < 1e-12);
        let second = fm.next().unwrap();
        assert!((second - 1.0f64.cos()).abs() < 1e-12);
        assert!((fm.deviation() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn dc_compensated_follows_recurrence() {
        let lpf = Modulation::DEFAULT_LPF;
        let input = [0.3, -0.2, 0.9, 0.1, 0.0, -0.7];
        let mut fm = Modulated::new(
            input.iter().copied(),
            60.0,
            rate(),
            Modulation::dc_compensated(),
        );

        let (mut dc, mut deviation) = (0.0f64, 0.0f64);
        for (k, &a) in input.iter().enumerate() {
            let i = (k + 1) as f64;
            dc = (1.0 - lpf) * dc + lpf * a - dc / i;
            deviation += a - dc;
            let expected = (TAU * 60.0 * i / 1000.0 + deviation).cos();
            let actual = fm.next().unwrap();
            assert!((actual - expected).abs() < 1e-12, "sample {k}");
        }
        assert_eq!(fm.next(), None);
    }

    #[test]
    fn dc_compensation_slows_drift_from_biased_input() {
        let n = 2000;
        let mut simple = Modulated::new(repeat(1.0), 0.0, rate(), Modulation::Simple);
        let mut compensated =
            Modulated::new(repeat(1.0), 0.0, rate(), Modulation::dc_compensated());
        simple.by_ref().take(n).for_each(drop);
        compensated.by_ref().take(n).for_each(drop);

        assert!((simple.deviation() - n as f64).abs() < 1e-9);
        assert!(compensated.deviation() < simple.deviation());
    }

    #[test]
    fn output_stays_in_range() {
        let mut node = ModNode::new(rate(), 4.0).unwrap();
        node.attach(Input::node(SineNode::new(rate(), 640.0).unwrap())).unwrap();
        assert!(node.produce().unwrap().take(4096).all(|s| (-1.0..=1.0).contains(&s)));
    }

    #[test]
    fn produce_without_input_fails() {
        let mut node = ModNode::new(rate(), 4.0).unwrap();
        assert!(matches!(node.produce(), Err(Error::Unconnected { node: "ModNode" })));
    }

    #[test]
    fn weighted_input_is_rejected() {
        let mut node = ModNode::new(rate(), 4.0).unwrap();
        let err = node
            .attach(Input::node(ConstantNode::new(0.0).unwrap()).with_weight(0.5))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(!node.is_connected());
    }

    #[test]
    fn mismatched_rate_is_rejected() {
        let mut node = ModNode::new(rate(), 4.0).unwrap();
        let other = SineNode::new(FrameRate::new(44_100).unwrap(), 440.0).unwrap();
        assert!(matches!(
            node.attach(Input::node(other)),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn second_attach_replaces_first() {
        let mut node = ModNode::new(rate(), 0.0).unwrap();
        node.attach(Input::signal(repeat(1.0))).unwrap();
        node.attach(Input::signal(repeat(0.0))).unwrap();
        let samples: Vec<Sample> = node.produce().unwrap().take(4).collect();
        assert_eq!(samples, vec![1.0; 4]);
    }

    #[test]
    fn non_finite_carrier_is_rejected() {
        assert!(matches!(ModNode::new(rate(), f64::NAN), Err(Error::Configuration(_))));
        assert!(matches!(ModNode::new(rate(), f64::INFINITY), Err(Error::Configuration(_))));
    }

    #[test]
    fn builder_keeps_settings() {
        let node = ModNode::new(rate(), 4.0).unwrap();
        assert_eq!(node.frequency(), 4.0);
        assert_eq!(node.modulation(), Modulation::Simple);

        let node = node.with_modulation(Modulation::dc_compensated());
        assert_eq!(
            node.modulation(),
            Modulation::DcCompensated {
                lpf: Modulation::DEFAULT_LPF
            }
        );
    }
}
