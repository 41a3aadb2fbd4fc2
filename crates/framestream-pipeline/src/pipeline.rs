// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Ordered, lazily evaluated chains of stages.
//!
//! A pipeline connects the output sequence of each stage to the input of the next
//! without buffering anything in between. Pulling one frame from the final sequence
//! pulls only what each stage needs from its upstream.
//!
//! Pipelines are stages themselves: a pipeline is a [`Transform`], and a
//! [`Generator`] when its first stage generates. Nesting a pipeline gives the same
//! output as splicing its stages into the outer pipeline (see [`Pipeline::flatten`]).

use std::fmt::{Debug, Display, Formatter};

use framestream_config::PipelineConfig;
use framestream_structures::{FrameArray, FramestreamError};
use tracing::debug;

use crate::generator::Generator;
use crate::sequence::FrameSequence;
use crate::stage::Stage;
use crate::transform::{Transform, TransformKind};

const DEFAULT_PIPELINE_NAME: &str = "pipeline";

/// Runtime options of a pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Emit a trace event for every frame each stage yields
    pub trace_frames: bool,
    /// Initial capacity reserved by [`Pipeline::to_array`]
    pub materialize_capacity: usize,
}

impl From<&PipelineConfig> for PipelineOptions {
    fn from(config: &PipelineConfig) -> Self {
        PipelineOptions {
            trace_frames: config.trace_frames,
            materialize_capacity: config.materialize_capacity,
        }
    }
}

/// An ordered composition of stages.
///
/// # Example
/// ```
/// use framestream_pipeline::{frame_transform, FrameSource, Pipeline, Stage};
///
/// let mut pipeline = Pipeline::new(vec![
///     Stage::generator(FrameSource::new(vec![1, 2, 3])),
///     Stage::transform(frame_transform(|x: i32| Ok(x * 2))),
/// ])?;
/// assert_eq!(pipeline.to_array(None)?, vec![2, 4, 6]);
/// # Ok::<(), framestream_structures::FramestreamError>(())
/// ```
pub struct Pipeline<'s, F> {
    stages: Vec<Stage<'s, F>>,
    options: PipelineOptions,
    name: String,
}

impl<'s, F> Pipeline<'s, F> {
    /// Builds a pipeline, checking its structure.
    ///
    /// # Errors
    ///
    /// [`FramestreamError::ConfigurationError`] when `stages` is empty, when a stage after
    /// the first is a generator (or a nested pipeline that cannot take input), or when a
    /// transform declares neither per-frame nor per-sequence processing.
    pub fn new(stages: Vec<Stage<'s, F>>) -> Result<Self, FramestreamError> {
        Self::with_options(stages, PipelineOptions::default())
    }

    pub fn with_options(stages: Vec<Stage<'s, F>>, options: PipelineOptions) -> Result<Self, FramestreamError> {
        validate_stages(&stages)?;
        debug!(
            "[PIPELINE] Built pipeline with {} stages: {}",
            stages.len(),
            describe_stages(&stages)
        );
        Ok(Pipeline {
            stages,
            options,
            name: DEFAULT_PIPELINE_NAME.to_string(),
        })
    }

    pub fn builder() -> PipelineBuilder<'s, F> {
        PipelineBuilder::new()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: PipelineOptions) {
        self.options = options;
    }

    pub fn stages(&self) -> &[Stage<'s, F>] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false for a constructed pipeline; kept alongside `len`.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Whether the pipeline can run without input frames.
    pub fn is_generator(&self) -> bool {
        self.stages.first().is_some_and(Stage::can_generate)
    }

    /// Whether the pipeline can consume an external sequence.
    pub fn accepts_input(&self) -> bool {
        self.stages.first().is_some_and(Stage::can_transform)
    }

    /// Chains every stage lazily and returns the output of the last one.
    ///
    /// With `frames == None` the first stage must be a generator and seeds the chain.
    /// Otherwise the first stage transforms `frames`. Nothing is pulled before the
    /// returned sequence is.
    ///
    /// # Errors
    ///
    /// [`FramestreamError::ConfigurationError`] when no frames are given and the first
    /// stage cannot generate, or frames are given and the first stage cannot take them.
    pub fn process_sequence<'a>(
        &'a mut self,
        frames: Option<FrameSequence<'a, F>>,
    ) -> Result<FrameSequence<'a, F>, FramestreamError>
    where
        F: 'a,
    {
        let Pipeline { stages, options, name } = self;
        let name: &str = name;
        let trace_frames = options.trace_frames;
        debug!(
            "[PIPELINE] Wiring '{}' ({} stages, {} input)",
            name,
            stages.len(),
            if frames.is_some() { "external" } else { "generated" }
        );

        let (head, rest) = stages.split_first_mut().ok_or_else(|| {
            FramestreamError::ConfigurationError(format!("Pipeline '{}' has no stages", name))
        })?;

        let mut sequence = match frames {
            None => match head {
                Stage::Generator(generator) => generator.generate(),
                Stage::Pipeline(inner) => inner.process_sequence(None)?,
                Stage::Transform(transform) => {
                    return Err(FramestreamError::ConfigurationError(format!(
                        "Pipeline '{}' received no input frames and its first stage '{}' is not a generator",
                        name,
                        transform.name()
                    )))
                }
            },
            Some(frames) => match head {
                Stage::Transform(transform) => transform.process_sequence(frames),
                Stage::Pipeline(inner) => inner.process_sequence(Some(frames))?,
                Stage::Generator(generator) => {
                    return Err(FramestreamError::ConfigurationError(format!(
                        "Pipeline '{}' received input frames but its first stage '{}' is a generator",
                        name,
                        generator.name()
                    )))
                }
            },
        };
        if trace_frames {
            sequence = sequence.traced(format!("{}[0]", name));
        }

        for (offset, stage) in rest.iter_mut().enumerate() {
            let index = offset + 1;
            sequence = match stage {
                Stage::Transform(transform) => transform.process_sequence(sequence),
                Stage::Pipeline(inner) => inner.process_sequence(Some(sequence))?,
                Stage::Generator(generator) => {
                    return Err(FramestreamError::ConfigurationError(format!(
                        "Pipeline '{}' stage {} '{}' is a generator; only the first stage may generate frames",
                        name,
                        index,
                        generator.name()
                    )))
                }
            };
            if trace_frames {
                sequence = sequence.traced(format!("{}[{}]", name, index));
            }
        }

        Ok(sequence)
    }

    /// Runs the chain and drains its output into a dense array.
    ///
    /// An empty output gives an empty array. Never returns if the chain is unbounded.
    pub fn to_array<'a>(
        &'a mut self,
        frames: Option<FrameSequence<'a, F>>,
    ) -> Result<FrameArray<F>, FramestreamError>
    where
        F: 'a,
    {
        let capacity = self.options.materialize_capacity;
        let frames = self.process_sequence(frames)?.collect_frames_with_capacity(capacity)?;
        debug!("[PIPELINE] Materialized {} frames", frames.len());
        Ok(frames)
    }

    /// Splices nested pipelines into this one, recursively.
    ///
    /// The result produces the same output as the nested form. Names and options of
    /// nested pipelines are dropped.
    pub fn flatten(self) -> Self {
        let Pipeline { stages, options, name } = self;
        let mut flattened = Vec::with_capacity(stages.len());
        for stage in stages {
            match stage {
                Stage::Pipeline(inner) => flattened.extend(inner.flatten().stages),
                other => flattened.push(other),
            }
        }
        Pipeline {
            stages: flattened,
            options,
            name,
        }
    }
}

fn validate_stages<F>(stages: &[Stage<'_, F>]) -> Result<(), FramestreamError> {
    if stages.is_empty() {
        return Err(FramestreamError::ConfigurationError(
            "A pipeline requires at least one stage".into(),
        ));
    }

    for (index, stage) in stages.iter().enumerate() {
        match stage {
            Stage::Transform(transform) if transform.kind().is_none() => {
                return Err(FramestreamError::ConfigurationError(format!(
                    "Stage {} '{}' declares neither per-frame nor per-sequence processing",
                    index,
                    transform.name()
                )));
            }
            Stage::Generator(generator) if index > 0 => {
                return Err(FramestreamError::ConfigurationError(format!(
                    "Stage {} '{}' is a generator; only the first stage may generate frames",
                    index,
                    generator.name()
                )));
            }
            Stage::Pipeline(inner) if index > 0 && !inner.accepts_input() => {
                return Err(FramestreamError::ConfigurationError(format!(
                    "Stage {} is pipeline '{}' whose first stage cannot take input frames",
                    index,
                    inner.name()
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

fn describe_stages<F>(stages: &[Stage<'_, F>]) -> String {
    stages
        .iter()
        .map(|stage| match stage {
            Stage::Pipeline(inner) => inner.to_string(),
            other => other.name().to_string(),
        })
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl<'s, F> Transform<F> for Pipeline<'s, F> {
    fn kind(&self) -> Option<TransformKind> {
        Some(TransformKind::PerSequence)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn process_sequence<'a>(&'a mut self, frames: FrameSequence<'a, F>) -> FrameSequence<'a, F> {
        Pipeline::process_sequence(self, Some(frames)).unwrap_or_else(FrameSequence::failed)
    }
}

impl<'s, F> Generator<F> for Pipeline<'s, F> {
    /// Yields a configuration error on first pull if the first stage cannot generate.
    fn generate<'a>(&'a mut self) -> FrameSequence<'a, F> {
        Pipeline::process_sequence(self, None).unwrap_or_else(FrameSequence::failed)
    }

    /// Follows the first stage; stateful downstream transforms are the caller's concern.
    fn is_restartable(&self) -> bool {
        match self.stages.first() {
            Some(Stage::Generator(generator)) => generator.is_restartable(),
            Some(Stage::Pipeline(inner)) => inner.is_generator() && inner.is_restartable(),
            _ => false,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<'s, F> Display for Pipeline<'s, F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, describe_stages(&self.stages))
    }
}

impl<'s, F> Debug for Pipeline<'s, F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("stages", &self.stages)
            .field("options", &self.options)
            .finish()
    }
}

/// Incremental construction of a [`Pipeline`].
///
/// ```
/// use framestream_pipeline::{Identity, Pipeline};
///
/// let mut pipeline = Pipeline::builder()
///     .generator(vec![1, 2, 3].into_iter())
///     .transform(Identity)
///     .name("passthrough")
///     .build()?;
/// assert_eq!(pipeline.name(), "passthrough");
/// assert_eq!(pipeline.to_array(None)?, vec![1, 2, 3]);
/// # Ok::<(), framestream_structures::FramestreamError>(())
/// ```
pub struct PipelineBuilder<'s, F> {
    stages: Vec<Stage<'s, F>>,
    options: PipelineOptions,
    name: Option<String>,
}

impl<'s, F> Default for PipelineBuilder<'s, F> {
    fn default() -> Self {
        PipelineBuilder {
            stages: Vec::new(),
            options: PipelineOptions::default(),
            name: None,
        }
    }
}

impl<'s, F> PipelineBuilder<'s, F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generator<G>(self, generator: G) -> Self
    where
        G: Generator<F> + 's,
    {
        self.stage(Stage::generator(generator))
    }

    pub fn transform<T>(self, transform: T) -> Self
    where
        T: Transform<F> + 's,
    {
        self.stage(Stage::transform(transform))
    }

    pub fn pipeline(self, pipeline: Pipeline<'s, F>) -> Self {
        self.stage(Stage::Pipeline(pipeline))
    }

    pub fn stage(mut self, stage: Stage<'s, F>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// # Errors
    ///
    /// Same as [`Pipeline::new`].
    pub fn build(self) -> Result<Pipeline<'s, F>, FramestreamError> {
        let pipeline = Pipeline::with_options(self.stages, self.options)?;
        Ok(match self.name {
            Some(name) => pipeline.with_name(name),
            None => pipeline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::FrameSource;
    use crate::transform::{frame_transform, Identity};

    #[test]
    fn test_empty_pipeline_rejected() {
        let result: Result<Pipeline<'_, i32>, _> = Pipeline::new(Vec::new());
        assert!(matches!(result, Err(FramestreamError::ConfigurationError(_))));
    }

    #[test]
    fn test_transform_head_requires_frames() {
        let mut pipeline = Pipeline::new(vec![Stage::transform(Identity)]).unwrap();
        assert!(!pipeline.is_generator());
        assert!(pipeline.accepts_input());
        assert!(matches!(
            pipeline.to_array(None),
            Err(FramestreamError::ConfigurationError(_))
        ));
        assert_eq!(
            pipeline.to_array(Some(FrameSequence::from_frames(vec![4, 5]))).unwrap(),
            vec![4, 5]
        );
    }

    #[test]
    fn test_generator_head_rejects_frames() {
        let mut pipeline = Pipeline::new(vec![Stage::generator(FrameSource::new(vec![1]))]).unwrap();
        assert!(pipeline.is_generator());
        assert!(!pipeline.accepts_input());
        let result = pipeline.process_sequence(Some(FrameSequence::from_frames(vec![9])));
        assert!(matches!(result, Err(FramestreamError::ConfigurationError(_))));
    }

    #[test]
    fn test_nested_head_without_input() {
        let source = Pipeline::new(vec![Stage::generator(FrameSource::new(vec![1, 2]))]).unwrap();
        let mut generated = Pipeline::new(vec![Stage::pipeline(source), Stage::transform(Identity)]).unwrap();
        assert_eq!(generated.to_array(None).unwrap(), vec![1, 2]);

        let chain: Pipeline<'_, i32> = Pipeline::new(vec![Stage::transform(Identity)]).unwrap().with_name("chain");
        let mut headless = Pipeline::new(vec![Stage::pipeline(chain)]).unwrap();
        let err = headless.to_array(None).unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("identity"));
    }

    #[test]
    fn test_display_lists_stages() {
        let inner = Pipeline::new(vec![Stage::transform(Identity)])
            .unwrap()
            .with_name("inner");
        let outer = Pipeline::new(vec![
            Stage::generator(FrameSource::new(vec![1])),
            Stage::Pipeline(inner),
            Stage::transform(frame_transform(|x: i32| Ok(x)).named("noop")),
        ])
        .unwrap()
        .with_name("outer");
        assert_eq!(outer.to_string(), "outer(frame_source -> inner(identity) -> noop)");
    }

    #[test]
    fn test_options_from_config() {
        let config = PipelineConfig {
            trace_frames: true,
            materialize_capacity: 32,
        };
        let options = PipelineOptions::from(&config);
        assert!(options.trace_frames);
        assert_eq!(options.materialize_capacity, 32);
    }

    #[test]
    fn test_traced_pipeline_produces_same_output() {
        let options = PipelineOptions {
            trace_frames: true,
            materialize_capacity: 4,
        };
        let mut pipeline = Pipeline::with_options(
            vec![
                Stage::generator(FrameSource::new(vec![1, 2, 3])),
                Stage::transform(frame_transform(|x: i32| Ok(x + 10))),
            ],
            options,
        )
        .unwrap();
        assert_eq!(pipeline.to_array(None).unwrap(), vec![11, 12, 13]);
    }
}
