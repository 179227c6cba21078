//! Transformer trait for data transformation

use eyre::Result;

/// Transformer trait for transforming data items
///
/// Stream preprocessors are transformers over byte buffers, see
/// [`StreamProcessor`](super::StreamProcessor).
///
/// # Example
/// ```
/// use multistage_ingest::etl::Transformer;
/// use eyre::Result;
///
/// struct Uppercase;
///
/// impl Transformer for Uppercase {
///     type Input = Vec<u8>;
///     type Output = Vec<u8>;
///
///     fn transform(&self, input: Self::Input) -> Result<Self::Output> {
///         Ok(input.to_ascii_uppercase())
///     }
/// }
///
/// assert_eq!(Uppercase.transform(b"abc".to_vec()).unwrap(), b"ABC");
/// ```
pub trait Transformer: Send + Sync {
    /// Input item type
    type Input: Send;

    /// Output item type after transformation
    type Output: Send;

    /// Transform a single item
    ///
    /// # Errors
    /// Returns an error if transformation fails (decompression, decoding, etc.)
    fn transform(&self, input: Self::Input) -> Result<Self::Output>;

    /// Transform multiple items (default batch implementation)
    fn transform_many(&self, inputs: Vec<Self::Input>) -> Result<Vec<Self::Output>> {
        inputs.into_iter().map(|i| self.transform(i)).collect()
    }

    /// Short name used in diagnostics
    ///
    /// The type name without its module path or generic arguments.
    fn name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Reverse;

    impl Transformer for Reverse {
        type Input = Vec<u8>;
        type Output = Vec<u8>;

        fn transform(&self, mut input: Self::Input) -> Result<Self::Output> {
            input.reverse();
            Ok(input)
        }
    }

    #[test]
    fn test_transform_many() {
        let output = Reverse
            .transform_many(vec![b"ab".to_vec(), b"xyz".to_vec()])
            .unwrap();
        assert_eq!(output, vec![b"ba".to_vec(), b"zyx".to_vec()]);
    }

    struct Chain<T>(T);

    impl<T: Transformer<Input = Vec<u8>, Output = Vec<u8>>> Transformer for Chain<T> {
        type Input = Vec<u8>;
        type Output = Vec<u8>;

        fn transform(&self, input: Self::Input) -> Result<Self::Output> {
            self.0.transform(input)
        }
    }

    #[test]
    fn test_name() {
        assert_eq!(Reverse.name(), "Reverse");
    }

    #[test]
    fn test_name_drops_generic_arguments() {
        let chained = Chain(Reverse);
        assert_eq!(chained.name(), "Chain");
        assert_eq!(chained.transform(b"ab".to_vec()).unwrap(), b"ba");
    }
}
