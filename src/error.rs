//! Error types for convolution, edge detection and restoration operations.

use numr::dtype::DType;
use thiserror::Error;

/// Result type for imgrestore operations.
pub type RestoreResult<T> = Result<T, RestoreError>;

/// Errors that can occur while filtering or restoring images.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RestoreError {
    /// Rank or extent disagreement between participating buffers.
    #[error("Shape mismatch in {context}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        context: String,
    },

    /// The requested output would be empty or negative-sized.
    #[error("Invalid shape {shape:?} in {context}")]
    InvalidShape { shape: Vec<usize>, context: String },

    /// A configuration value reached a code path that cannot handle it.
    #[error("Unsupported configuration: {message}")]
    UnsupportedConfiguration { message: String },

    /// Element type not handled by the operation.
    #[error("Unsupported dtype {dtype:?} for {op}")]
    UnsupportedDType { dtype: DType, op: &'static str },

    /// Invalid parameter value.
    #[error("Invalid parameter '{parameter}': {message}")]
    InvalidParameter { parameter: String, message: String },

    /// The machine has no trained filter yet.
    #[error("Wiener machine has not been trained")]
    Untrained,

    /// Error from underlying numr operation.
    #[error("numr error: {0}")]
    NumrError(String),
}

impl From<numr::error::Error> for RestoreError {
    fn from(err: numr::error::Error) -> Self {
        Self::NumrError(err.to_string())
    }
}

impl RestoreError {
    pub(crate) fn shape_mismatch(expected: &[usize], got: &[usize], context: &str) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
            context: context.to_string(),
        }
    }

    pub(crate) fn invalid_shape(shape: &[usize], context: &str) -> Self {
        Self::InvalidShape {
            shape: shape.to_vec(),
            context: context.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_shape_mismatch() {
        let err = RestoreError::shape_mismatch(&[2, 5, 5], &[3, 5, 5], "sobel output");
        assert_eq!(
            err.to_string(),
            "Shape mismatch in sobel output: expected [2, 5, 5], got [3, 5, 5]"
        );
    }

    #[test]
    fn test_display_untrained() {
        assert_eq!(
            RestoreError::Untrained.to_string(),
            "Wiener machine has not been trained"
        );
    }
}
