//! Error taxonomy shared by loading, pipeline execution and output.
//!
//! | Variant | Raised when |
//! |---|---|
//! | [`Error::Load`] | the input cannot be read or decoded |
//! | [`Error::Format`] | no target format can be resolved or parsed |
//! | [`Error::Size`] | input bytes or output dimensions exceed configured limits |
//! | [`Error::Processing`] | one pipeline operation failed (wraps its kind + cause) |
//! | [`Error::Output`] / [`Error::Write`] | encoding or persisting the result failed |
//!
//! Failing to hit an optimizer size target is not an error; see
//! [`optimize`](crate::encode::optimize::optimize).

use crate::format::Format;
use crate::pipeline::OperationKind;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for every public operation in the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot load image from {origin}: {reason}")]
    Load { origin: String, reason: String },

    #[error("{0}")]
    Format(String),

    #[error("{what} {actual} exceeds limit of {limit}")]
    Size {
        what: &'static str,
        actual: u64,
        limit: u64,
    },

    #[error("operation '{kind}' failed: {source}")]
    Processing {
        kind: OperationKind,
        #[source]
        source: OperationError,
    },

    #[error("failed to encode as {format}: {source}")]
    Output {
        format: Format,
        #[source]
        source: image::ImageError,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn load(origin: impl Into<String>, reason: impl ToString) -> Self {
        Error::Load {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    /// True for both encode and write failures.
    pub fn is_output(&self) -> bool {
        matches!(self, Error::Output { .. } | Error::Write { .. })
    }
}

/// Failure inside a single pipeline operation.
///
/// Never surfaces on its own: [`Pipeline::execute`](crate::pipeline::Pipeline::execute)
/// wraps it in [`Error::Processing`] together with the operation kind.
#[derive(Error, Debug)]
pub enum OperationError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("cannot read overlay {}: {source}", path.display())]
    Overlay {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("font error: {0}")]
    Font(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_error_names_operation() {
        let err = Error::Processing {
            kind: OperationKind::Crop,
            source: OperationError::InvalidParameter("width must be positive".into()),
        };
        assert_eq!(
            err.to_string(),
            "operation 'crop' failed: invalid parameter: width must be positive"
        );
    }

    #[test]
    fn processing_error_exposes_cause() {
        use std::error::Error as _;
        let err = Error::Processing {
            kind: OperationKind::Watermark,
            source: OperationError::Font("empty font data".into()),
        };
        let cause = err.source().expect("cause attached");
        assert_eq!(cause.to_string(), "font error: empty font data");
    }

    #[test]
    fn size_error_message() {
        let err = Error::Size {
            what: "input size (bytes)",
            actual: 120,
            limit: 100,
        };
        assert_eq!(err.to_string(), "input size (bytes) 120 exceeds limit of 100");
    }

    #[test]
    fn write_is_output_class() {
        let err = Error::Write {
            path: "/nope/out.png".into(),
            source: std::io::Error::other("denied"),
        };
        assert!(err.is_output());
        assert!(!Error::Format("x".into()).is_output());
    }
}
