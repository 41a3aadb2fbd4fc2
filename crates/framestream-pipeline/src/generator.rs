// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Zero-input frame producers.

use framestream_structures::{FrameArray, FramestreamError};

use crate::sequence::FrameSequence;

/// Produces a lazy frame sequence without any input.
///
/// Anything that is an [`Iterator`] over frames is a generator. Such generators are
/// single-pass: a second `generate` continues where the first traversal stopped. Use
/// [`FrameSource`] for a generator that replays its frames on every traversal.
pub trait Generator<F> {
    fn generate<'a>(&'a mut self) -> FrameSequence<'a, F>;

    /// Whether every call to `generate` starts again from the first frame.
    fn is_restartable(&self) -> bool {
        false
    }

    /// Label used in logs and pipeline descriptions.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Drains the generated sequence into a dense array, in production order.
    ///
    /// For an unbounded generator this never returns; bounding it is the caller's job.
    fn to_array(&mut self) -> Result<FrameArray<F>, FramestreamError> {
        self.generate().collect_frames()
    }
}

impl<F, I> Generator<F> for I
where
    I: Iterator<Item = F>,
{
    fn generate<'a>(&'a mut self) -> FrameSequence<'a, F> {
        FrameSequence::from_frames(self.by_ref())
    }
}

/// Restartable generator over an owned list of frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSource<F> {
    frames: Vec<F>,
}

impl<F> FrameSource<F> {
    pub fn new(frames: Vec<F>) -> Self {
        FrameSource { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl<F> FromIterator<F> for FrameSource<F> {
    fn from_iter<T: IntoIterator<Item = F>>(iter: T) -> Self {
        FrameSource::new(iter.into_iter().collect())
    }
}

impl<F: Clone> Generator<F> for FrameSource<F> {
    fn generate<'a>(&'a mut self) -> FrameSequence<'a, F> {
        FrameSequence::from_frames(self.frames.iter().cloned())
    }

    fn is_restartable(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "frame_source"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iterator_generator_is_single_pass() {
        let mut frames = vec![1, 2, 3].into_iter();
        assert!(!frames.is_restartable());
        assert_eq!(Generator::to_array(&mut frames).unwrap(), vec![1, 2, 3]);
        assert!(Generator::to_array(&mut frames).unwrap().is_empty());
    }

    #[test]
    fn test_partial_pull_resumes() {
        let mut counter = 0..5;
        let first: Vec<_> = counter.generate().take(2).collect();
        assert_eq!(first, vec![Ok(0), Ok(1)]);
        assert_eq!(Generator::to_array(&mut counter).unwrap(), vec![2, 3, 4]);
    }

    #[test]
    fn test_frame_source_replays() {
        let mut source = FrameSource::new(vec!["a", "b"]);
        assert!(source.is_restartable());
        assert_eq!(source.to_array().unwrap(), vec!["a", "b"]);
        assert_eq!(source.to_array().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_source() {
        let mut source: FrameSource<u8> = FrameSource::new(Vec::new());
        assert!(source.is_empty());
        assert_eq!(source.to_array().unwrap().len(), 0);
    }
}
