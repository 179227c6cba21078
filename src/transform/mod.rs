//! Stream preprocessor implementations
//!
//! Each preprocessor is a byte-to-byte [`Transformer`](crate::etl::Transformer)
//! that an extractor registers on its [`ExtractorKeys`](crate::keys::ExtractorKeys).

mod bom;
mod gunzip;

pub use bom::Utf8BomStripper;
pub use gunzip::GunzipProcessor;
