// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Common error type for framestream operations.
///
/// Structural misuse of a pipeline surfaces as [`FramestreamError::ConfigurationError`],
/// broken frame contracts as [`FramestreamError::StarvationError`]. Custom stages report
/// their own runtime failures through [`FramestreamError::StageError`].
///
/// # Examples
/// ```
/// use framestream_structures::FramestreamError;
///
/// fn require_stages(count: usize) -> Result<(), FramestreamError> {
///     if count == 0 {
///         return Err(FramestreamError::ConfigurationError("Pipeline has no stages".into()));
///     }
///     Ok(())
/// }
///
/// assert!(require_stages(0).is_err());
/// assert!(require_stages(3).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramestreamError {
    /// Structural misuse: empty pipeline, bad stage ordering, missing transform capability
    ConfigurationError(String),
    /// A derived per-frame call received no output for its single input frame
    StarvationError(String),
    /// A stage failed while processing a frame
    StageError(String),
    /// Invalid parameters provided to a function
    BadParameters(String),
}

impl FramestreamError {
    /// True for errors caused by how stages were put together rather than by frame data.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, FramestreamError::ConfigurationError(_))
    }

    pub fn is_starvation_error(&self) -> bool {
        matches!(self, FramestreamError::StarvationError(_))
    }
}

impl Display for FramestreamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FramestreamError::ConfigurationError(msg) => write!(f, "Configuration Error: {}", msg),
            FramestreamError::StarvationError(msg) => write!(f, "Starvation Error: {}", msg),
            FramestreamError::StageError(msg) => write!(f, "Stage Error: {}", msg),
            FramestreamError::BadParameters(msg) => write!(f, "Bad Parameters: {}", msg),
        }
    }
}

impl Error for FramestreamError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = FramestreamError::ConfigurationError("empty".into());
        assert_eq!(err.to_string(), "Configuration Error: empty");
        let err = FramestreamError::StarvationError("no output".into());
        assert_eq!(err.to_string(), "Starvation Error: no output");
    }

    #[test]
    fn test_kind_checks() {
        assert!(FramestreamError::ConfigurationError(String::new()).is_configuration_error());
        assert!(!FramestreamError::StageError(String::new()).is_configuration_error());
        assert!(FramestreamError::StarvationError(String::new()).is_starvation_error());
    }
}
