//! UTF-8 byte order mark stripper
//!
//! Spreadsheet exports often start with a BOM, which would otherwise end up
//! in the first column name.

use crate::etl::Transformer;
use eyre::Result;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Stream preprocessor that removes a leading UTF-8 byte order mark
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8BomStripper;

impl Transformer for Utf8BomStripper {
    type Input = Vec<u8>;
    type Output = Vec<u8>;

    fn transform(&self, mut input: Self::Input) -> Result<Self::Output> {
        if input.starts_with(UTF8_BOM) {
            input.drain(..UTF8_BOM.len());
        }
        Ok(input)
    }
}
