//! Gunzip preprocessor
//!
//! Decompresses gzip payloads, e.g. `.csv.gz` objects fetched from a bucket.
//! Concatenated gzip members decode into one continuous stream.

use crate::etl::Transformer;
use eyre::{Context, Result};
use flate2::read::MultiGzDecoder;
use std::io::Read;

/// Stream preprocessor that gunzips its input
///
/// # Example
/// ```
/// use multistage_ingest::transform::GunzipProcessor;
/// use multistage_ingest::etl::Transformer;
/// use flate2::{Compression, write::GzEncoder};
/// use std::io::Write;
///
/// let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
/// encoder.write_all(b"id,name\n1,alpha\n").unwrap();
/// let compressed = encoder.finish().unwrap();
///
/// let output = GunzipProcessor.transform(compressed).unwrap();
/// assert_eq!(output, b"id,name\n1,alpha\n");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct GunzipProcessor;

impl Transformer for GunzipProcessor {
    type Input = Vec<u8>;
    type Output = Vec<u8>;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        let mut decoder = MultiGzDecoder::new(input.as_slice());
        let mut output = Vec::with_capacity(input.len() * 4);
        decoder
            .read_to_end(&mut output)
            .with_context(|| "Failed to gunzip payload")?;

        log::debug!(
            "Gunzipped {} bytes into {} bytes",
            input.len(),
            output.len()
        );

        Ok(output)
    }
}
