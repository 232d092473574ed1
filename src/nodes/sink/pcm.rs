//! Fixed-width PCM frame encoding.

use core::convert::TryInto;
use core::fmt;
use core::str::FromStr;

use crate::error::{Error, Result};
use crate::node::Sample;

/// Binary layout of one rendered sample.
///
/// All frames are little-endian and mono; there is no header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Encoding {
    /// 4-byte IEEE-754 single precision.
    #[default]
    Float32,
    /// 2-byte signed integer scaled by `2^(bit_depth - 1) - 1`.
    Int16 { bit_depth: u32 },
}

impl Encoding {
    /// Full-scale 16-bit integer frames.
    pub fn int16() -> Self {
        Encoding::Int16 { bit_depth: 16 }
    }

    /// Rejects bit depths that do not fit a 16-bit frame.
    pub fn validate(self) -> Result<Self> {
        match self {
            Encoding::Int16 { bit_depth } if !(2..=16).contains(&bit_depth) => Err(Error::config(
                format!("int16 frames need a bit depth between 2 and 16, got {bit_depth}"),
            )),
            _ => Ok(self),
        }
    }

    /// Bytes per frame.
    #[inline]
    pub fn frame_width(self) -> usize {
        match self {
            Encoding::Float32 => 4,
            Encoding::Int16 { .. } => 2,
        }
    }

    /// Largest integer magnitude, for integer encodings.
    #[inline]
    pub fn max_amplitude(self) -> Option<f64> {
        match self {
            Encoding::Float32 => None,
            Encoding::Int16 { bit_depth } => Some(2f64.powi(bit_depth as i32 - 1) - 1.0),
        }
    }

    /// Encode a sample that is already within [-1, 1].
    pub fn encode(self, sample: Sample) -> Frame {
        let mut bytes = [0u8; 4];
        match self {
            Encoding::Float32 => bytes.copy_from_slice(&(sample as f32).to_le_bytes()),
            Encoding::Int16 { .. } => {
                let max = self.max_amplitude().unwrap_or(i16::MAX as f64);
                let v = (max * sample).round() as i16;
                bytes[..2].copy_from_slice(&v.to_le_bytes());
            }
        }
        Frame {
            bytes,
            len: self.frame_width(),
        }
    }

    /// Inverse of [`encode`](Self::encode). `None` if `bytes` is not one frame wide.
    pub fn decode(self, bytes: &[u8]) -> Option<Sample> {
        match self {
            Encoding::Float32 => {
                let raw: [u8; 4] = bytes.try_into().ok()?;
                Some(f32::from_le_bytes(raw) as Sample)
            }
            Encoding::Int16 { .. } => {
                let raw: [u8; 2] = bytes.try_into().ok()?;
                let max = self.max_amplitude()?;
                Some(i16::from_le_bytes(raw) as Sample / max)
            }
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Float32 => f.write_str("f32"),
            Encoding::Int16 { bit_depth } => write!(f, "i16 ({bit_depth}-bit)"),
        }
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "f32" | "float32" => Ok(Encoding::Float32),
            "i16" | "int16" => Ok(Encoding::int16()),
            other => Err(Error::config(format!("unknown encoding {other:?}"))),
        }
    }
}

/// One encoded sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; 4],
    len: usize,
}

impl Frame {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Clamp a sample into the encodable range [-1, 1].
///
/// Infinities saturate like any other out-of-range value. NaN carries no
/// amplitude and is rendered as silence (`0.0`).
#[inline]
pub fn clip(sample: Sample) -> Sample {
    if sample.is_nan() {
        return 0.0;
    }
    sample.clamp(-1.0, 1.0)
}
