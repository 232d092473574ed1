//! PCM dump sink

use std::io::Write;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::node::{fill_slot, BoxedSignal, FrameRate, Input, Node};
use crate::nodes::sink::pcm::{clip, Encoding};

/// A sink that renders its input into raw PCM frames.
///
/// Samples are clamped to [-1, 1] (NaN becomes silence, see [`clip`]) and
/// written one frame at a time to any [`Write`]r. The sink keeps its input between calls, so a second
/// [`dump`](Self::dump) continues where the first one stopped.
pub struct DumpNode {
    rate: FrameRate,
    encoding: Encoding,
    input: Option<BoxedSignal>,
}

impl DumpNode {
    pub fn new(rate: FrameRate, encoding: Encoding) -> Result<Self> {
        Ok(Self {
            rate,
            encoding: encoding.validate()?,
            input: None,
        })
    }

    #[inline]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.input.is_some()
    }

    /// Pull `duration` seconds of input and write them to `output`.
    ///
    /// Returns the number of frames written, which is
    /// `floor(duration * rate)` unless the input ends early. A failed write
    /// aborts the dump immediately.
    ///
    /// Each frame is handed over whole through one `write_all`. A writer
    /// that accepts part of a frame and then fails may still hold that
    /// partial frame. Frame atomicity is up to the writer; callers that
    /// need it should discard the output on error.
    pub fn dump<W: Write + ?Sized>(&mut self, output: &mut W, duration: f64) -> Result<usize> {
        let count = self.rate.frames_in(duration)?;
        let encoding = self.encoding;
        let input = self
            .input
            .as_mut()
            .ok_or(Error::Unconnected { node: "DumpNode" })?;

        debug!(frames = count, %encoding, "dumping");
        let mut written = 0;
        for sample in input.by_ref().take(count) {
            output.write_all(encoding.encode(clip(sample)).as_bytes())?;
            written += 1;
        }

        info!(
            frames = written,
            bytes = written * encoding.frame_width(),
            "dump finished"
        );
        Ok(written)
    }
}

impl Node for DumpNode {
    fn name(&self) -> &'static str {
        "DumpNode"
    }

    #[inline]
    fn num_inputs(&self) -> usize {
        1
    }

    #[inline]
    fn num_outputs(&self) -> usize {
        0
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

    /// Sinks have no output to hand out.
    fn produce(&mut self) -> Result<BoxedSignal> {
        Err(Error::InvalidSignalType { node: self.name() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::effect::ModNode;
    use crate::nodes::source::{ConstantNode, SineNode};
    use core::iter::repeat;
    use std::io;

    fn rate() -> FrameRate {
        FrameRate::new(100).unwrap()
    }

    fn render(value: f64, encoding: Encoding) -> Vec<u8> {
        let mut sink = DumpNode::new(rate(), encoding).unwrap();
        sink.attach(Input::node(ConstantNode::new(value).unwrap())).unwrap();
        let mut out = Vec::<u8>::new();
        sink.dump(&mut out, 0.05).unwrap();
        out
    }

    #[test]
    fn clamps_out_of_range_samples() {
        for &encoding in &[Encoding::Float32, Encoding::int16()] {
            assert_eq!(render(1.5, encoding), render(1.0, encoding));
            assert_eq!(render(-2.0, encoding), render(-1.0, encoding));
        }
    }

    #[test]
    fn non_finite_samples_stay_in_range() {
        for &encoding in &[Encoding::Float32, Encoding::int16()] {
            let mut sink = DumpNode::new(rate(), encoding).unwrap();
            let samples = vec![f64::NAN, f64::INFINITY, f64::NEG_INFINITY];
            sink.attach(Input::signal(samples.into_iter())).unwrap();
            let mut out = Vec::<u8>::new();
            assert_eq!(sink.dump(&mut out, 1.0).unwrap(), 3);

            let decoded: Vec<f64> = out
                .chunks(encoding.frame_width())
                .map(|frame| encoding.decode(frame).unwrap())
                .collect();
            assert_eq!(decoded, vec![0.0, 1.0, -1.0]);
        }
    }

    #[test]
    fn overflowing_modulator_renders_silence() {
        let mut modulator = ModNode::new(rate(), 4.0).unwrap();
        modulator.attach(Input::node(ConstantNode::new(f64::MAX).unwrap())).unwrap();
        let mut sink = DumpNode::new(rate(), Encoding::Float32).unwrap();
        sink.attach(Input::node(modulator)).unwrap();

        let mut out = Vec::<u8>::new();
        assert_eq!(sink.dump(&mut out, 0.035).unwrap(), 3);
        for frame in out.chunks(4) {
            let s = Encoding::Float32.decode(frame).unwrap();
            assert!((-1.0..=1.0).contains(&s), "{s} escaped the clamp");
        }
    }

    #[test]
    fn writes_floor_of_duration_frames() {
        let mut sink = DumpNode::new(rate(), Encoding::Float32).unwrap();
        sink.attach(Input::node(SineNode::new(rate(), 5.0).unwrap())).unwrap();

        let mut out = Vec::<u8>::new();
        assert_eq!(sink.dump(&mut out, 2.0).unwrap(), 200);
        assert_eq!(out.len(), 200 * 4);

        out.clear();
        assert_eq!(sink.dump(&mut out, 0.019).unwrap(), 1);
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn continues_where_previous_dump_stopped() {
        let mut sink = DumpNode::new(rate(), Encoding::Float32).unwrap();
        sink.attach(Input::signal((0..).map(|i| i as f64 / 1000.0))).unwrap();

        let mut first = Vec::<u8>::new();
        let mut second = Vec::<u8>::new();
        sink.dump(&mut first, 0.02).unwrap();
        sink.dump(&mut second, 0.01).unwrap();

        assert_eq!(Encoding::Float32.decode(&second), Some(0.002f32 as f64));
    }

    #[test]
    fn short_input_writes_fewer_frames() {
        let mut sink = DumpNode::new(rate(), Encoding::int16()).unwrap();
        sink.attach(Input::signal(vec![0.1, 0.2, 0.3].into_iter())).unwrap();
        let mut out = Vec::<u8>::new();
        assert_eq!(sink.dump(&mut out, 1.0).unwrap(), 3);
        assert_eq!(out.len(), 6);
    }

    #[test]
    fn negative_duration_is_rejected() {
        let mut sink = DumpNode::new(rate(), Encoding::Float32).unwrap();
        sink.attach(Input::signal(repeat(0.0))).unwrap();
        let err = sink.dump(&mut Vec::<u8>::new(), -1.0).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn unconnected_dump_fails() {
        let mut sink = DumpNode::new(rate(), Encoding::Float32).unwrap();
        let err = sink.dump(&mut Vec::<u8>::new(), 1.0).unwrap_err();
        assert!(matches!(err, Error::Unconnected { node: "DumpNode" }));
    }

    #[test]
    fn invalid_bit_depth_is_rejected() {
        let err = DumpNode::new(rate(), Encoding::Int16 { bit_depth: 24 }).err();
        assert!(matches!(err, Some(Error::Configuration(_))));

        let sink = DumpNode::new(rate(), Encoding::Int16 { bit_depth: 12 }).unwrap();
        assert_eq!(sink.encoding(), Encoding::Int16 { bit_depth: 12 });
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_is_surfaced() {
        let mut sink = DumpNode::new(rate(), Encoding::Float32).unwrap();
        sink.attach(Input::signal(repeat(0.0))).unwrap();
        let err = sink.dump(&mut Broken, 1.0).unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn has_no_output() {
        let mut sink = DumpNode::new(rate(), Encoding::Float32).unwrap();
        assert_eq!(sink.num_outputs(), 0);
        assert!(matches!(sink.produce(), Err(Error::InvalidSignalType { .. })));
    }
}
