// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Dense, in-memory frame collections produced by eager materialization.

use std::ops::Index;

use ndarray::{Array, ArrayView, Axis, Dimension, RemoveAxis};

use crate::FramestreamError;

/// Frames drained from a sequence, in production order.
///
/// Length always equals the number of frames that were produced. For frames that are
/// themselves `ndarray` arrays, [`FrameArray::stack`] builds a single array with a
/// leading frame axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameArray<F> {
    frames: Vec<F>,
}

impl<F> Default for FrameArray<F> {
    fn default() -> Self {
        FrameArray { frames: Vec::new() }
    }
}

impl<F> FrameArray<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        FrameArray {
            frames: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, frame: F) {
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&F> {
        self.frames.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, F> {
        self.frames.iter()
    }

    pub fn as_slice(&self) -> &[F] {
        &self.frames
    }

    pub fn into_vec(self) -> Vec<F> {
        self.frames
    }
}

impl<A, D> FrameArray<Array<A, D>>
where
    A: Clone,
    D: Dimension,
    D::Larger: RemoveAxis,
{
    /// Stacks all frames along a new leading axis.
    ///
    /// An empty collection becomes an array with every axis of length zero. Frames of
    /// differing shapes are rejected with [`FramestreamError::BadParameters`].
    pub fn stack(&self) -> Result<Array<A, D::Larger>, FramestreamError> {
        if self.frames.is_empty() {
            let ndim = <D::Larger as Dimension>::NDIM.unwrap_or(1);
            let shape = <D::Larger as Dimension>::zeros(ndim);
            return Array::from_shape_vec(shape, Vec::new()).map_err(|err| {
                FramestreamError::BadParameters(format!("Unable to build empty frame array: {}", err))
            });
        }

        let views: Vec<ArrayView<'_, A, D>> = self.frames.iter().map(|frame| frame.view()).collect();
        ndarray::stack(Axis(0), &views).map_err(|err| {
            FramestreamError::BadParameters(format!(
                "Unable to stack {} frames into a single array: {}",
                self.frames.len(),
                err
            ))
        })
    }
}

impl<F> Index<usize> for FrameArray<F> {
    type Output = F;

    fn index(&self, index: usize) -> &Self::Output {
        &self.frames[index]
    }
}

impl<F> From<Vec<F>> for FrameArray<F> {
    fn from(frames: Vec<F>) -> Self {
        FrameArray { frames }
    }
}

impl<F> From<FrameArray<F>> for Vec<F> {
    fn from(array: FrameArray<F>) -> Self {
        array.frames
    }
}

impl<F> FromIterator<F> for FrameArray<F> {
    fn from_iter<T: IntoIterator<Item = F>>(iter: T) -> Self {
        FrameArray {
            frames: iter.into_iter().collect(),
        }
    }
}

impl<F> Extend<F> for FrameArray<F> {
    fn extend<T: IntoIterator<Item = F>>(&mut self, iter: T) {
        self.frames.extend(iter);
    }
}

impl<F> IntoIterator for FrameArray<F> {
    type Item = F;
    type IntoIter = std::vec::IntoIter<F>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.into_iter()
    }
}

impl<'a, F> IntoIterator for &'a FrameArray<F> {
    type Item = &'a F;
    type IntoIter = std::slice::Iter<'a, F>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

impl<F: PartialEq> PartialEq<Vec<F>> for FrameArray<F> {
    fn eq(&self, other: &Vec<F>) -> bool {
        &self.frames == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    #[test]
    fn test_index_and_order() {
        let frames: FrameArray<i32> = vec![3, 1, 2].into();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], 3);
        assert_eq!(frames[2], 2);
        assert_eq!(frames, vec![3, 1, 2]);
    }

    #[test]
    fn test_stack_adds_leading_axis() {
        let frames: FrameArray<Array1<f32>> =
            vec![array![1.0, 2.0], array![3.0, 4.0], array![5.0, 6.0]].into();
        let stacked = frames.stack().unwrap();
        assert_eq!(stacked.shape(), &[3, 2]);
        assert_eq!(stacked[[2, 1]], 6.0);
    }

    #[test]
    fn test_stack_empty_is_empty_array() {
        let frames: FrameArray<Array1<f32>> = FrameArray::new();
        let stacked = frames.stack().unwrap();
        assert_eq!(stacked.len(), 0);
        assert_eq!(stacked.ndim(), 2);
    }

    #[test]
    fn test_stack_rejects_mismatched_shapes() {
        let frames: FrameArray<Array1<f32>> = vec![array![1.0, 2.0], array![3.0]].into();
        let err = frames.stack().unwrap_err();
        assert!(matches!(err, FramestreamError::BadParameters(_)));
    }
}
