//! Errors raised while resolving and installing a release asset.
//!
//! Only [`FetchError::ExhaustedCandidates`] ends a run. Every other variant
//! is scoped to a single candidate and the search moves on to the next name.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The asset does not exist under this name (4xx/5xx, transport error,
    /// timeout, or a response without a body).
    CandidateAbsent { name: String, reason: String },
    /// The candidate's extension has no decoder.
    UnsupportedFormat { extension: String },
    /// Reading the network stream, decoding it, or writing the temporary
    /// file failed.
    StreamIo { name: String, message: String },
    /// No candidate produced an installed artifact.
    ExhaustedCandidates { names: Vec<String>, prefix: String },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::CandidateAbsent { name, reason } => {
                write!(f, "{} is not available: {}", name, reason)
            }
            FetchError::UnsupportedFormat { extension } => {
                write!(f, "Unsupported compression format: {}", extension)
            }
            FetchError::StreamIo { name, message } => {
                write!(f, "Failed to install {}: {}", name, message)
            }
            FetchError::ExhaustedCandidates { names, prefix } => {
                write!(
                    f,
                    "Could not download any of: {} from {}",
                    names.join(", "),
                    prefix
                )
            }
        }
    }
}

impl std::error::Error for FetchError {}
