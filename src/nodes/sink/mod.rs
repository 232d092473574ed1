mod dump;
mod pcm;

pub use dump::*;
pub use pcm::*;
