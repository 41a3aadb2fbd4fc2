// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The core crate for framestream. Defines the error type and the dense frame
//! collection shared by every other crate in the workspace.

mod error;
mod frame_array;

pub use error::FramestreamError;
pub use frame_array::FrameArray;

/// Outcome of processing or pulling a single frame.
pub type FrameResult<F> = Result<F, FramestreamError>;
