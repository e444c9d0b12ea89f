//! Fusion of fixed traffic radar detections into validated vehicle tracks.
//!
//! Frames of sensor-local detections are filtered, rotated into a shared
//! planar frame, deduplicated across overlapping sensors and followed by
//! sensor-assigned identity. Tracks that are long enough and end inside a
//! region of interest are exported together with aggregate statistics.

pub mod error;
pub mod fusion;
pub mod integration;
pub mod tracker;

pub use error::{FusionError, Result};
pub use fusion::{
    CoordinateTransformer, Detection, DetectionFilter, DetectionMerger, FilterConfig,
    GlobalDetection, MergePair, SensorConfig, SensorRegistry,
};
pub use integration::{
    DetectionBuilder, FrameReport, FrameSource, FusionPipeline, IterSource, PipelineConfig,
    RawDetection, RawFrame, RecordFilter, RunSummary, StopFilter, TracksDocument,
};
pub use tracker::{
    LengthSummary, RegionOfInterest, RunMetadata, RunStatistics, Track, TrackKey, TrackManager,
    TrackManagerConfig, TrackRecord, TrackState, TrackValidator, UpdateSummary,
};
