//! # framestream
//!
//! Lazy, pull-driven processing of frame streams. Frames flow from a generator through
//! a chain of transforms, one frame at a time, only as fast as the final consumer pulls.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! framestream = "0.1"  # Default: config + observability
//! ```
//!
//! ## Feature Flags
//!
//! - **`config`** (default): TOML configuration loader
//! - **`observability`** (default): logging setup and per-crate debug flags
//! - **`file-logging`**: JSON log files in timestamped run folders
//!
//! ## Usage
//!
//! ```rust
//! use framestream::prelude::*;
//!
//! let mut pipeline = Pipeline::new(vec![
//!     Stage::generator(FrameSource::new(vec![1, 2, 3])),
//!     Stage::transform(frame_transform(|x: i32| Ok(x * 2))),
//! ])?;
//! assert_eq!(pipeline.to_array(None)?, vec![2, 4, 6]);
//! # Ok::<(), FramestreamError>(())
//! ```

// Re-export foundation
pub use framestream_pipeline as pipeline;
pub use framestream_structures as structures;

// Re-export infrastructure
#[cfg(feature = "config")]
pub use framestream_config as config;

#[cfg(feature = "observability")]
pub use framestream_observability as observability;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::pipeline::{
        frame_transform, sequence_transform, FrameSequence, FrameSource, Generator, Identity, Pipeline,
        PipelineBuilder, PipelineOptions, Stage, Transform, TransformKind,
    };
    pub use crate::structures::{FrameArray, FrameResult, FramestreamError};

    #[cfg(feature = "config")]
    pub use crate::config::{load_config, validate_config, FramestreamConfig};

    #[cfg(feature = "observability")]
    pub use crate::observability::{init_logging, parse_debug_flags, CrateDebugFlags};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_facade_imports() {
        use crate::prelude::*;
        let mut source = FrameSource::new(vec![1_u8]);
        assert!(source.is_restartable());
        assert_eq!(source.to_array().map(FrameArray::into_vec), Ok(vec![1]));
    }
}
