// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! One link of a pipeline.

use std::fmt::{Debug, Formatter};

use crate::generator::Generator;
use crate::pipeline::Pipeline;
use crate::transform::Transform;

/// A pipeline stage: a generator, a transform, or a nested pipeline.
///
/// Only the first stage of a pipeline may generate frames. A nested pipeline can
/// generate when its own first stage can, and can transform when its first stage
/// accepts input.
pub enum Stage<'s, F> {
    Generator(Box<dyn Generator<F> + 's>),
    Transform(Box<dyn Transform<F> + 's>),
    Pipeline(Pipeline<'s, F>),
}

impl<'s, F> Stage<'s, F> {
    pub fn generator<G>(generator: G) -> Self
    where
        G: Generator<F> + 's,
    {
        Stage::Generator(Box::new(generator))
    }

    pub fn transform<T>(transform: T) -> Self
    where
        T: Transform<F> + 's,
    {
        Stage::Transform(Box::new(transform))
    }

    pub fn pipeline(pipeline: Pipeline<'s, F>) -> Self {
        Stage::Pipeline(pipeline)
    }

    pub fn name(&self) -> &str {
        match self {
            Stage::Generator(generator) => generator.name(),
            Stage::Transform(transform) => transform.name(),
            Stage::Pipeline(pipeline) => pipeline.name(),
        }
    }

    /// Whether this stage can seed a pipeline without input frames.
    pub fn can_generate(&self) -> bool {
        match self {
            Stage::Generator(_) => true,
            Stage::Transform(_) => false,
            Stage::Pipeline(pipeline) => pipeline.is_generator(),
        }
    }

    /// Whether this stage can consume an upstream sequence.
    pub fn can_transform(&self) -> bool {
        match self {
            Stage::Generator(_) => false,
            Stage::Transform(transform) => transform.kind().is_some(),
            Stage::Pipeline(pipeline) => pipeline.accepts_input(),
        }
    }
}

impl<'s, F> From<Pipeline<'s, F>> for Stage<'s, F> {
    fn from(pipeline: Pipeline<'s, F>) -> Self {
        Stage::Pipeline(pipeline)
    }
}

impl<'s, F> Debug for Stage<'s, F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Generator(generator) => write!(f, "Generator({})", generator.name()),
            Stage::Transform(transform) => match transform.kind() {
                Some(kind) => write!(f, "Transform({}, {})", transform.name(), kind),
                None => write!(f, "Transform({}, untagged)", transform.name()),
            },
            Stage::Pipeline(pipeline) => write!(f, "{:?}", pipeline),
        }
    }
}
