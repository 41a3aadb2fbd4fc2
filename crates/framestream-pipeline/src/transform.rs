// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The dual per-frame / per-sequence transform contract.
//!
//! An implementer provides exactly one of [`Transform::process_frame`] or
//! [`Transform::process_sequence`] and tags which one through [`Transform::kind`].
//! The other method is derived from it:
//!
//! - per-frame implementations get a lazy element-wise `process_sequence`
//! - per-sequence implementations get a `process_frame` that feeds a one-frame
//!   sequence through `process_sequence` and returns its first output
//!
//! The tag decides the direction of the derivation, so the two defaults never call
//! each other in a loop. An untagged transform fails with
//! [`FramestreamError::ConfigurationError`].

use std::fmt::{Display, Formatter};

use framestream_structures::{FrameResult, FramestreamError};
use tracing::warn;

use crate::sequence::FrameSequence;

/// Which of the two processing methods a transform implements itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    /// `process_frame` is implemented, `process_sequence` is derived.
    PerFrame,
    /// `process_sequence` is implemented, `process_frame` is derived.
    PerSequence,
}

impl Display for TransformKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformKind::PerFrame => write!(f, "per-frame"),
            TransformKind::PerSequence => write!(f, "per-sequence"),
        }
    }
}

/// A stage that consumes frames and produces frames.
///
/// A transform may keep mutable state (running statistics, previous frames). The lazy
/// sequence returned by `process_sequence` borrows the transform mutably, so that state
/// lives across one traversal. Reusing the same instance for another traversal is up to
/// the caller.
///
/// # Example
/// ```
/// use framestream_pipeline::{FrameSequence, Transform, TransformKind};
/// use framestream_structures::FramestreamError;
///
/// struct Double;
///
/// impl Transform<i32> for Double {
///     fn kind(&self) -> Option<TransformKind> {
///         Some(TransformKind::PerFrame)
///     }
///
///     fn process_frame(&mut self, frame: i32) -> Result<i32, FramestreamError> {
///         Ok(frame * 2)
///     }
/// }
///
/// let mut double = Double;
/// let doubled: Vec<i32> = double
///     .process_sequence(FrameSequence::from_frames(vec![1, 2, 3]))
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(doubled, vec![2, 4, 6]);
/// ```
pub trait Transform<F> {
    /// The method this transform implements. `None` means neither, which makes both
    /// methods fail and is rejected when the transform is placed in a pipeline.
    fn kind(&self) -> Option<TransformKind> {
        None
    }

    /// Label used in logs and pipeline descriptions.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Processes exactly one frame into exactly one result.
    ///
    /// The derived version fails with [`FramestreamError::StarvationError`] when
    /// `process_sequence` yields nothing for the single input frame. Transforms that
    /// drop or delay frames should not rely on it.
    fn process_frame(&mut self, frame: F) -> FrameResult<F> {
        match self.kind() {
            Some(TransformKind::PerSequence) => {
                let first = self.process_sequence(FrameSequence::singleton(frame)).next();
                match first {
                    Some(result) => result,
                    None => {
                        warn!(
                            "[TRANSFORM] '{}' produced no output for a single input frame",
                            self.name()
                        );
                        Err(FramestreamError::StarvationError(format!(
                            "Transform '{}' produced no output for a single input frame",
                            self.name()
                        )))
                    }
                }
            }
            kind => Err(missing_derivation(self.name(), "process_frame", kind)),
        }
    }

    /// Lazily processes `frames`, pulling from it only as the output is pulled.
    ///
    /// The derived version maps `process_frame` over the input, keeping order and
    /// producing one output per input.
    fn process_sequence<'a>(&'a mut self, frames: FrameSequence<'a, F>) -> FrameSequence<'a, F> {
        match self.kind() {
            Some(TransformKind::PerFrame) => FrameSequence::new(
                frames.map(move |item| item.and_then(|frame| self.process_frame(frame))),
            ),
            kind => FrameSequence::failed(missing_derivation(self.name(), "process_sequence", kind)),
        }
    }
}

fn missing_derivation(name: &str, method: &str, kind: Option<TransformKind>) -> FramestreamError {
    let detail = match kind {
        None => "declares neither per-frame nor per-sequence processing".to_string(),
        Some(kind) => format!("declares {} processing but does not implement it", kind),
    };
    warn!("[TRANSFORM] '{}' cannot derive {}: it {}", name, method, detail);
    FramestreamError::ConfigurationError(format!(
        "Transform '{}' cannot derive {}: it {}",
        name, method, detail
    ))
}

impl<F, T: Transform<F> + ?Sized> Transform<F> for Box<T> {
    fn kind(&self) -> Option<TransformKind> {
        (**self).kind()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn process_frame(&mut self, frame: F) -> FrameResult<F> {
        (**self).process_frame(frame)
    }

    fn process_sequence<'a>(&'a mut self, frames: FrameSequence<'a, F>) -> FrameSequence<'a, F> {
        (**self).process_sequence(frames)
    }
}

/// Lets a caller keep ownership of a transform (and its state) while a pipeline uses it.
impl<F, T: Transform<F> + ?Sized> Transform<F> for &mut T {
    fn kind(&self) -> Option<TransformKind> {
        (**self).kind()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn process_frame(&mut self, frame: F) -> FrameResult<F> {
        (**self).process_frame(frame)
    }

    fn process_sequence<'a>(&'a mut self, frames: FrameSequence<'a, F>) -> FrameSequence<'a, F> {
        (**self).process_sequence(frames)
    }
}

/// Passes every frame through unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

impl<F> Transform<F> for Identity {
    fn kind(&self) -> Option<TransformKind> {
        Some(TransformKind::PerFrame)
    }

    fn name(&self) -> &str {
        "identity"
    }

    fn process_frame(&mut self, frame: F) -> FrameResult<F> {
        Ok(frame)
    }
}

/// Per-frame transform backed by a closure. Build one with [`frame_transform`].
#[derive(Debug, Clone)]
pub struct FrameFn<Func> {
    func: Func,
    name: String,
}

impl<Func> FrameFn<Func> {
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Builds a per-frame transform from `func`.
///
/// ```
/// use framestream_pipeline::{frame_transform, Transform};
///
/// let mut square = frame_transform(|x: i32| Ok(x * x)).named("square");
/// assert_eq!(square.process_frame(7), Ok(49));
/// ```
pub fn frame_transform<F, Func>(func: Func) -> FrameFn<Func>
where
    Func: FnMut(F) -> FrameResult<F>,
{
    FrameFn {
        func,
        name: "frame_fn".to_string(),
    }
}

impl<F, Func> Transform<F> for FrameFn<Func>
where
    Func: FnMut(F) -> FrameResult<F>,
{
    fn kind(&self) -> Option<TransformKind> {
        Some(TransformKind::PerFrame)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn process_frame(&mut self, frame: F) -> FrameResult<F> {
        (self.func)(frame)
    }
}

/// Per-sequence transform backed by a closure. Build one with [`sequence_transform`].
#[derive(Debug, Clone)]
pub struct SequenceFn<Func> {
    func: Func,
    name: String,
}

impl<Func> SequenceFn<Func> {
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Builds a per-sequence transform from `func`, which receives the whole input
/// sequence and returns the output sequence.
///
/// ```
/// use framestream_pipeline::{sequence_transform, FrameSequence, Transform};
///
/// let mut evens = sequence_transform(|frames: FrameSequence<'_, i32>| {
///     FrameSequence::new(frames.filter(|item| !matches!(item, Ok(x) if x % 2 != 0)))
/// });
/// let kept: Vec<i32> = evens
///     .process_sequence(FrameSequence::from_frames(1..=6))
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(kept, vec![2, 4, 6]);
/// ```
pub fn sequence_transform<F, Func>(func: Func) -> SequenceFn<Func>
where
    Func: for<'a> FnMut(FrameSequence<'a, F>) -> FrameSequence<'a, F>,
{
    SequenceFn {
        func,
        name: "sequence_fn".to_string(),
    }
}

impl<F, Func> Transform<F> for SequenceFn<Func>
where
    Func: for<'a> FnMut(FrameSequence<'a, F>) -> FrameSequence<'a, F>,
{
    fn kind(&self) -> Option<TransformKind> {
        Some(TransformKind::PerSequence)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn process_sequence<'a>(&'a mut self, frames: FrameSequence<'a, F>) -> FrameSequence<'a, F> {
        (self.func)(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Untagged;

    impl Transform<i32> for Untagged {}

    /// Tagged per-frame but never implements process_frame
    struct MislabeledPerFrame;

    impl Transform<i32> for MislabeledPerFrame {
        fn kind(&self) -> Option<TransformKind> {
            Some(TransformKind::PerFrame)
        }
    }

    struct PairSum {
        previous: Option<i32>,
    }

    /// Emits one output for every two inputs
    impl Transform<i32> for PairSum {
        fn kind(&self) -> Option<TransformKind> {
            Some(TransformKind::PerSequence)
        }

        fn process_sequence<'a>(&'a mut self, frames: FrameSequence<'a, i32>) -> FrameSequence<'a, i32> {
            FrameSequence::new(frames.filter_map(move |item| match item {
                Err(err) => Some(Err(err)),
                Ok(frame) => match self.previous.take() {
                    Some(previous) => Some(Ok(previous + frame)),
                    None => {
                        self.previous = Some(frame);
                        None
                    }
                },
            }))
        }
    }

    #[test]
    fn test_untagged_fails_both_ways() {
        let mut transform = Untagged;
        assert!(matches!(
            transform.process_frame(1),
            Err(FramestreamError::ConfigurationError(_))
        ));
        let mut outputs = transform.process_sequence(FrameSequence::from_frames(vec![1, 2]));
        assert!(matches!(
            outputs.next(),
            Some(Err(FramestreamError::ConfigurationError(_)))
        ));
        assert_eq!(outputs.next(), None);
    }

    #[test]
    fn test_mislabeled_transform_does_not_recurse() {
        let mut transform = MislabeledPerFrame;
        assert!(matches!(
            transform.process_frame(1),
            Err(FramestreamError::ConfigurationError(_))
        ));
        let collected = transform
            .process_sequence(FrameSequence::from_frames(vec![1]))
            .collect_frames();
        assert!(matches!(collected, Err(FramestreamError::ConfigurationError(_))));
    }

    #[test]
    fn test_dropping_transform_starves_process_frame() {
        let mut transform = PairSum { previous: None };
        assert!(matches!(
            transform.process_frame(5),
            Err(FramestreamError::StarvationError(_))
        ));
        // The buffered frame from the starved call is still held
        assert_eq!(transform.process_frame(6), Ok(11));
    }

    #[test]
    fn test_upstream_error_passes_through_derived_sequence() {
        let mut transform = frame_transform(|x: i32| Ok(x + 1));
        let input = FrameSequence::new(
            vec![Ok(1), Err(FramestreamError::StageError("upstream".into())), Ok(3)].into_iter(),
        );
        let outputs: Vec<_> = transform.process_sequence(input).collect();
        assert_eq!(
            outputs,
            vec![Ok(2), Err(FramestreamError::StageError("upstream".into()))]
        );
    }

    #[test]
    fn test_boxed_and_borrowed_forward() {
        let mut boxed: Box<dyn Transform<i32>> = Box::new(frame_transform(|x: i32| Ok(-x)).named("negate"));
        assert_eq!(boxed.kind(), Some(TransformKind::PerFrame));
        assert_eq!(boxed.name(), "negate");
        assert_eq!(boxed.process_frame(3), Ok(-3));

        let mut identity = Identity;
        let mut borrowed = &mut identity;
        assert_eq!(Transform::<i32>::process_frame(&mut borrowed, 9), Ok(9));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(TransformKind::PerFrame.to_string(), "per-frame");
        assert_eq!(TransformKind::PerSequence.to_string(), "per-sequence");
    }
}
