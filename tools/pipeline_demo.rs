// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Pipeline Demo Tool

Runs a small frame pipeline (source -> gain -> running mean) over 1D `f32` frames and
prints the stacked result.

Usage:
  cargo run --bin pipeline_demo -- --frames 5 --gain 0.5
  cargo run --bin pipeline_demo -- --config framestream.toml --debug framestream-pipeline

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ndarray::Array1;
use tracing::{debug, info};

use framestream::config::{
    apply_cli_overrides, apply_environment_overrides, find_config_file, load_config, validate_config,
    FramestreamConfig,
};
use framestream::observability::{debug_flags_help, init_logging, parse_debug_flags};
use framestream::prelude::*;

/// Runs a demo pipeline over generated 1D frames
#[derive(Parser, Debug)]
#[command(name = "pipeline_demo", version, long_about = None, after_help = debug_flags_help())]
struct Args {
    /// Path to a framestream.toml (searched for when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to generate
    #[arg(short, long, default_value_t = 5)]
    frames: usize,

    /// Number of samples per frame
    #[arg(short, long, default_value_t = 4)]
    width: usize,

    /// Gain applied to every sample
    #[arg(short, long, default_value_t = 2.0)]
    gain: f32,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Crates to log at debug level (comma-separated, or "all")
    #[arg(long)]
    debug: Vec<String>,
}

/// Multiplies every sample of a frame by a constant
struct Gain {
    gain: f32,
}

impl Gain {
    fn new(gain: f32) -> Result<Self, FramestreamError> {
        if !gain.is_finite() {
            return Err(FramestreamError::BadParameters(format!(
                "Gain must be a finite number, got {}",
                gain
            )));
        }
        Ok(Gain { gain })
    }
}

impl Transform<Array1<f32>> for Gain {
    fn kind(&self) -> Option<TransformKind> {
        Some(TransformKind::PerFrame)
    }

    fn name(&self) -> &str {
        "gain"
    }

    fn process_frame(&mut self, frame: Array1<f32>) -> FrameResult<Array1<f32>> {
        Ok(frame * self.gain)
    }
}

/// Element-wise mean of every frame seen so far in the current traversal
#[derive(Default)]
struct RunningMean {
    sum: Option<Array1<f32>>,
    count: usize,
}

impl RunningMean {
    fn update(&mut self, frame: Array1<f32>) -> FrameResult<Array1<f32>> {
        let sum = match self.sum.take() {
            None => frame,
            Some(sum) if sum.len() == frame.len() => sum + frame,
            Some(sum) => {
                return Err(FramestreamError::StageError(format!(
                    "Frame of width {} does not match running width {}",
                    frame.len(),
                    sum.len()
                )))
            }
        };
        self.count += 1;
        let mean = &sum / self.count as f32;
        self.sum = Some(sum);
        Ok(mean)
    }
}

impl Transform<Array1<f32>> for RunningMean {
    fn kind(&self) -> Option<TransformKind> {
        Some(TransformKind::PerSequence)
    }

    fn name(&self) -> &str {
        "running_mean"
    }

    fn process_sequence<'a>(&'a mut self, frames: FrameSequence<'a, Array1<f32>>) -> FrameSequence<'a, Array1<f32>> {
        self.sum = None;
        self.count = 0;
        FrameSequence::new(frames.map(move |item| item.and_then(|frame| self.update(frame))))
    }
}

fn load_demo_config(args: &Args) -> Result<FramestreamConfig> {
    let mut cli_args = HashMap::new();
    if let Some(level) = &args.log_level {
        cli_args.insert("log_level".to_string(), level.clone());
    }

    let config_path = match &args.config {
        Some(path) => Some(path.clone()),
        None => find_config_file().ok(),
    };

    let config = match config_path {
        Some(path) => load_config(Some(path.as_path()), Some(&cli_args))
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            let mut config = FramestreamConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, &cli_args);
            config
        }
    };
    validate_config(&config).context("Invalid configuration")?;
    Ok(config)
}

fn demo_frames(count: usize, width: usize) -> Vec<Array1<f32>> {
    (0..count)
        .map(|index| Array1::from_iter((0..width).map(|offset| (index + offset) as f32)))
        .collect()
}

/// Drops `--debug-<crate>` flags, which `parse_debug_flags` reads on its own.
fn clap_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter().filter(|arg| !arg.starts_with("--debug-")).collect()
}

fn main() -> Result<()> {
    let args = Args::parse_from(clap_args(env::args()));
    let config = load_demo_config(&args)?;

    let mut debug_flags = parse_debug_flags();
    for list in &args.debug {
        debug_flags.merge_list(list);
    }
    let _logging_guard = init_logging(&debug_flags, &config.logging)?;
    debug!("[PIPELINE] Demo arguments: {:?}", args);

    let mut pipeline = Pipeline::builder()
        .generator(FrameSource::new(demo_frames(args.frames, args.width)))
        .transform(Gain::new(args.gain)?)
        .transform(RunningMean::default())
        .options(PipelineOptions::from(&config.pipeline))
        .name("demo")
        .build()?;
    info!("[PIPELINE] Running {}", pipeline);

    let output = pipeline.to_array(None)?;
    info!("[PIPELINE] Produced {} frames", output.len());
    let stacked = output.stack()?;

    println!("Pipeline: {}", pipeline);
    println!("Output shape: {:?}", stacked.shape());
    for (index, row) in stacked.outer_iter().enumerate() {
        println!("  frame {:>3}: {}", index, row);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_crate_debug_flags_bypass_clap() {
        let raw: Vec<String> = ["pipeline_demo", "--debug-framestream-pipeline", "--frames", "2", "--debug-all"]
            .iter()
            .map(|arg| arg.to_string())
            .collect();
        let args = Args::try_parse_from(clap_args(raw)).unwrap();
        assert_eq!(args.frames, 2);
        assert!(args.debug.is_empty());
    }

    #[test]
    fn test_help_lists_debug_flags() {
        let help = <Args as clap::CommandFactory>::command().render_help().to_string();
        assert!(help.contains("--debug-all"));
        assert!(help.contains("framestream-pipeline"));
    }

    #[test]
    fn test_gain_rejects_non_finite() {
        assert!(Gain::new(f32::NAN).is_err());
        assert!(Gain::new(f32::INFINITY).is_err());
        assert!(Gain::new(0.25).is_ok());
    }

    #[test]
    fn test_running_mean_over_pipeline() {
        let mut pipeline = Pipeline::builder()
            .generator(FrameSource::new(demo_frames(3, 2)))
            .transform(Gain::new(2.0).unwrap())
            .transform(RunningMean::default())
            .build()
            .unwrap();
        let stacked = pipeline.to_array(None).unwrap().stack().unwrap();
        assert_eq!(stacked.shape(), &[3, 2]);
        // Gained frames are [0, 2], [2, 4], [4, 6]
        let expected: ndarray::Array2<f32> = ndarray::array![[0.0, 2.0], [1.0, 3.0], [2.0, 4.0]];
        assert_eq!(stacked, expected);
    }

    #[test]
    fn test_running_mean_resets_per_traversal() {
        let mut mean = RunningMean::default();
        let first = mean
            .process_sequence(FrameSequence::from_frames(demo_frames(2, 1)))
            .collect_frames()
            .unwrap();
        let second = mean
            .process_sequence(FrameSequence::from_frames(demo_frames(2, 1)))
            .collect_frames()
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_running_mean_rejects_width_change() {
        let frames = vec![Array1::zeros(2), Array1::zeros(3)];
        let result = RunningMean::default()
            .process_sequence(FrameSequence::from_frames(frames))
            .collect_frames();
        assert!(matches!(result, Err(FramestreamError::StageError(_))));
    }
}
