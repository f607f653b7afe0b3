//! Error taxonomy for segmentation requests.

use thiserror::Error;

/// Errors raised by parsing and segmentation.
///
/// A regime with no qualifying rows is not an error; it yields an empty collection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SegmentError {
    /// The request string could not be parsed.
    #[error("malformed request {request:?}: {reason}")]
    MalformedRequest { request: String, reason: String },

    /// The series has no rows.
    #[error("series is empty")]
    EmptySeries,

    /// The request combines targets the regime cannot honour together.
    #[error("unsupported regime combination in {request:?}: {reason}")]
    UnsupportedRegimeCombination { request: String, reason: String },
}

impl SegmentError {
    pub(crate) fn malformed(request: &str, reason: impl Into<String>) -> Self {
        Self::MalformedRequest {
            request: request.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(request: &str, reason: impl Into<String>) -> Self {
        Self::UnsupportedRegimeCombination {
            request: request.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_message_includes_request() {
        let err = SegmentError::malformed("cc xyz", "missing unit");
        assert_eq!(
            err.to_string(),
            "malformed request \"cc xyz\": missing unit"
        );
    }

    #[test]
    fn empty_series_message() {
        assert_eq!(SegmentError::EmptySeries.to_string(), "series is empty");
    }
}
