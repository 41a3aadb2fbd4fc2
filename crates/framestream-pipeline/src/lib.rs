// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Lazy, pull-driven frame pipelines.
//!
//! Three kinds of stages compose into a [`Pipeline`]:
//! - a [`Generator`] produces frames from nothing and may only come first
//! - a [`Transform`] turns a [`FrameSequence`] into another one, implemented either
//!   per frame or per sequence (see [`TransformKind`])
//! - a nested [`Pipeline`], which behaves exactly like its stages spliced in place
//!
//! Frames move one at a time. Pulling from the output of a pipeline pulls from each
//! upstream stage only as far as needed, so unbounded generators are fine as long as
//! the consumer stops.
//!
//! ```
//! use framestream_pipeline::{frame_transform, FrameSource, Pipeline, Stage};
//!
//! let mut pipeline = Pipeline::new(vec![
//!     Stage::generator(FrameSource::new(vec![1, 2, 3])),
//!     Stage::transform(frame_transform(|x: i32| Ok(x * 10))),
//! ])?;
//! let frames = pipeline.to_array(None)?;
//! assert_eq!(frames, vec![10, 20, 30]);
//! # Ok::<(), framestream_structures::FramestreamError>(())
//! ```

mod generator;
mod pipeline;
mod sequence;
mod stage;
mod transform;

pub use generator::{FrameSource, Generator};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineOptions};
pub use sequence::FrameSequence;
pub use stage::Stage;
pub use transform::{
    frame_transform, sequence_transform, FrameFn, Identity, SequenceFn, Transform, TransformKind,
};
