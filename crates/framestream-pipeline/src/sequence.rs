// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Lazy frame sequences passed between pipeline stages.

use std::fmt::{Debug, Formatter};

use framestream_structures::{FrameArray, FrameResult, FramestreamError};
use tracing::trace;

/// A lazy, ordered, single-pass stream of frames.
///
/// Nothing is computed until the sequence is pulled. Each item is a [`FrameResult`]; the
/// first error ends the sequence. Once it has returned `None` or an error the sequence
/// is exhausted and every further pull returns `None`.
///
/// A sequence is owned by whoever pulls it. Handing it to a stage moves it, so no two
/// consumers can pull the same sequence.
pub struct FrameSequence<'a, F: 'a> {
    inner: Option<Box<dyn Iterator<Item = FrameResult<F>> + 'a>>,
}

impl<'a, F: 'a> FrameSequence<'a, F> {
    /// Wraps an iterator of already fallible frames.
    pub fn new<I>(items: I) -> Self
    where
        I: Iterator<Item = FrameResult<F>> + 'a,
    {
        FrameSequence {
            inner: Some(Box::new(items)),
        }
    }

    /// Wraps plain frames. The sequence stays lazy if `frames` is lazy.
    pub fn from_frames<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = F>,
        I::IntoIter: 'a,
    {
        Self::new(frames.into_iter().map(Ok))
    }

    pub fn singleton(frame: F) -> Self {
        Self::new(std::iter::once(Ok(frame)))
    }

    /// A sequence that yields `error` on its first pull and then ends.
    pub fn failed(error: FramestreamError) -> Self {
        Self::new(std::iter::once(Err(error)))
    }

    pub fn empty() -> Self {
        FrameSequence { inner: None }
    }

    /// Drains the sequence into a [`FrameArray`], stopping at the first error.
    ///
    /// Never returns for an unbounded sequence.
    pub fn collect_frames(self) -> Result<FrameArray<F>, FramestreamError> {
        self.collect_frames_with_capacity(0)
    }

    pub fn collect_frames_with_capacity(self, capacity: usize) -> Result<FrameArray<F>, FramestreamError> {
        let mut frames = FrameArray::with_capacity(capacity);
        for item in self {
            frames.push(item?);
        }
        Ok(frames)
    }

    /// Emits a trace event for every item pulled through this point of the chain.
    pub(crate) fn traced(self, label: String) -> Self {
        let mut pulled: usize = 0;
        Self::new(self.inspect(move |item| {
            pulled += 1;
            match item {
                Ok(_) => trace!("[PIPELINE] {} yielded frame #{}", label, pulled),
                Err(err) => trace!("[PIPELINE] {} failed on pull #{}: {}", label, pulled, err),
            }
        }))
    }
}

impl<'a, F> FrameSequence<'a, F> {
    /// True once the sequence has ended, either normally or with an error.
    pub fn is_exhausted(&self) -> bool {
        self.inner.is_none()
    }
}

impl<'a, F> Iterator for FrameSequence<'a, F> {
    type Item = FrameResult<F>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.as_mut()?.next();
        match item {
            Some(Ok(frame)) => Some(Ok(frame)),
            Some(Err(err)) => {
                self.inner = None;
                Some(Err(err))
            }
            None => {
                self.inner = None;
                None
            }
        }
    }
}

impl<'a, F> std::iter::FusedIterator for FrameSequence<'a, F> {}

impl<'a, F> Debug for FrameSequence<'a, F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSequence")
            .field("exhausted", &self.is_exhausted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_stays_exhausted() {
        let mut sequence = FrameSequence::from_frames(vec![1, 2]);
        assert!(!sequence.is_exhausted());
        assert_eq!(sequence.next(), Some(Ok(1)));
        assert_eq!(sequence.next(), Some(Ok(2)));
        assert_eq!(sequence.next(), None);
        assert!(sequence.is_exhausted());
        assert_eq!(sequence.next(), None);
    }

    #[test]
    fn test_error_ends_sequence() {
        let items = vec![
            Ok(1),
            Err(FramestreamError::StageError("bad frame".into())),
            Ok(3),
        ];
        let mut sequence = FrameSequence::new(items.into_iter());
        assert_eq!(sequence.next(), Some(Ok(1)));
        assert!(matches!(sequence.next(), Some(Err(FramestreamError::StageError(_)))));
        assert!(sequence.is_exhausted());
        assert_eq!(sequence.next(), None);
    }

    #[test]
    fn test_collect_returns_first_error() {
        let sequence: FrameSequence<'_, i32> =
            FrameSequence::failed(FramestreamError::StageError("boom".into()));
        assert_eq!(
            sequence.collect_frames(),
            Err(FramestreamError::StageError("boom".into()))
        );
    }

    #[test]
    fn test_empty_collects_to_empty_array() {
        let sequence: FrameSequence<'_, i32> = FrameSequence::empty();
        assert!(sequence.is_exhausted());
        assert!(sequence.collect_frames().unwrap().is_empty());
    }

    #[test]
    fn test_from_frames_is_lazy() {
        let mut produced = 0;
        let source = std::iter::from_fn(|| {
            produced += 1;
            Some(produced)
        });
        let mut sequence = FrameSequence::from_frames(source);
        assert_eq!(sequence.next(), Some(Ok(1)));
        assert_eq!(sequence.next(), Some(Ok(2)));
        drop(sequence);
        assert_eq!(produced, 2);
    }
}
