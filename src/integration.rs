//! Integration module for feeding raw sensor frames through the fusion core.
//!
//! This module provides the wire-level frame types, a frame source trait,
//! the end-to-end pipeline and the export documents consumed by persistence
//! and visualization front ends.

mod builder;
mod export;
mod frame;
mod pipeline;
mod source;

pub use builder::DetectionBuilder;
pub use export::{RecordFilter, StopFilter, TracksDocument};
pub use frame::{RawDetection, RawFrame, UNKNOWN_CATEGORY};
pub use pipeline::{FrameReport, FusionPipeline, PipelineConfig, RunSummary};
pub use source::{FrameSource, IterSource};
