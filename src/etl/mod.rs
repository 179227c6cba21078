//! Core transformation abstractions
//!
//! Stream preprocessors sit between a connector's raw response bytes and the
//! record decoder. Each one is a [`Transformer`] from bytes to bytes.

mod transform;

pub use transform::Transformer;

/// A stream transform stage: consumes bytes, produces bytes
pub type StreamProcessor = dyn Transformer<Input = Vec<u8>, Output = Vec<u8>>;
