//! FusionPipeline: filter, transform, merge and track, one frame at a time.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{FusionError, Result};
use crate::fusion::{
    CoordinateTransformer, Detection, DetectionFilter, DetectionMerger, FilterConfig, MergePair,
    SensorConfig, SensorRegistry,
};
use crate::integration::frame::RawFrame;
use crate::integration::source::FrameSource;
use crate::tracker::{RegionOfInterest, TrackManager, TrackManagerConfig, UpdateSummary};

/// Everything needed to build a [`FusionPipeline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(alias = "radars")]
    pub sensors: Vec<SensorConfig>,
    #[serde(alias = "center_roi")]
    pub region: RegionOfInterest,
    #[serde(default)]
    pub merge_pairs: Vec<MergePair>,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub tracker: TrackManagerConfig,
    /// Frames between progress log lines; 0 disables them.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
}

fn default_progress_interval() -> usize {
    1000
}

impl PipelineConfig {
    pub fn new(sensors: Vec<SensorConfig>, region: RegionOfInterest) -> Self {
        Self {
            sensors,
            region,
            merge_pairs: Vec::new(),
            filter: FilterConfig::default(),
            tracker: TrackManagerConfig::default(),
            progress_interval: default_progress_interval(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Per-frame detection accounting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub timestamp: f64,
    pub received: usize,
    pub filtered_out: usize,
    pub unresolved: usize,
    pub merged: usize,
    pub delivered: usize,
    pub update: UpdateSummary,
}

/// Outcome of [`FusionPipeline::run`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub frames_processed: usize,
    pub frames_rejected: usize,
    /// Tracks still active at stream end, dropped without finalization.
    pub unfinished_tracks: usize,
}

/// A combined pipeline from raw sensor frames to validated tracks.
pub struct FusionPipeline {
    registry: SensorRegistry,
    filter: DetectionFilter,
    mergers: Vec<DetectionMerger>,
    manager: TrackManager,
    progress_interval: usize,
    frames_processed: usize,
}

impl FusionPipeline {
    /// Validate the configuration and build the pipeline.
    ///
    /// Fails on an empty sensor list, a degenerate region or invalid
    /// tunables; merge pairs naming unknown sensors only log a warning.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let registry = SensorRegistry::new(config.sensors)?;

        let mergers = config
            .merge_pairs
            .into_iter()
            .map(|pair| {
                for name in [&pair.primary, &pair.secondary] {
                    if !registry.contains(name) {
                        warn!(sensor = %name, "merge pair names an unconfigured sensor");
                    }
                }
                DetectionMerger::new(pair)
            })
            .collect::<Result<Vec<_>>>()?;

        let roads = registry
            .sensors()
            .iter()
            .filter_map(|s| registry.road(&s.name).map(|r| (s.name.clone(), r.to_string())))
            .collect();
        let manager = TrackManager::new(config.tracker, config.region)?.with_road_table(roads);

        Ok(Self {
            registry,
            filter: DetectionFilter::new(config.filter),
            mergers,
            manager,
            progress_interval: config.progress_interval,
            frames_processed: 0,
        })
    }

    /// Process a single frame.
    ///
    /// A frame with a missing field or an out-of-order timestamp is rejected
    /// as a whole and the tracker state is left untouched.
    pub fn process_frame(&mut self, frame: &RawFrame) -> Result<FrameReport> {
        if let Some(previous) = self.manager.last_timestamp()
            && !(frame.timestamp > previous)
        {
            return Err(FusionError::NonMonotonicTimestamp {
                previous,
                current: frame.timestamp,
            });
        }

        let detections = frame
            .raw
            .iter()
            .map(|raw| -> Result<Detection> {
                let mut det = raw.validate()?;
                let name = self.registry.canonical_name(&det.sensor);
                if name != det.sensor {
                    det.sensor = name.to_string();
                }
                Ok(det)
            })
            .collect::<Result<Vec<Detection>>>()?;

        let received = detections.len();
        let accepted = self.filter.apply(&detections);
        let filtered_out = received - accepted.len();

        let (mut global, unresolved) = CoordinateTransformer::transform_frame(&accepted, &self.registry);

        let mut merged = 0;
        for merger in &self.mergers {
            let (next, count) = merger.merge(global);
            global = next;
            merged += count;
        }

        let update = self.manager.update(&global, frame.timestamp)?;
        self.frames_processed += 1;

        if self.progress_interval > 0 && self.frames_processed % self.progress_interval == 0 {
            info!(
                frames = self.frames_processed,
                complete = self.manager.completed().len(),
                created = self.manager.statistics().tracks_created(),
                "progress"
            );
            self.manager.log_state();
        }

        Ok(FrameReport {
            timestamp: frame.timestamp,
            received,
            filtered_out,
            unresolved,
            merged,
            delivered: global.len(),
            update,
        })
    }

    /// Drive a frame source to exhaustion.
    ///
    /// Recoverable frame errors are logged and skipped; a source error stops
    /// the run. Tracks still active at the end are dropped.
    pub fn run<S: FrameSource>(&mut self, source: &mut S) -> std::result::Result<RunSummary, S::Error> {
        let mut summary = RunSummary::default();
        while let Some(frame) = source.next_frame() {
            let frame = frame?;
            match self.process_frame(&frame) {
                Ok(_) => summary.frames_processed += 1,
                Err(err) => {
                    warn!(timestamp = frame.timestamp, %err, "frame rejected");
                    summary.frames_rejected += 1;
                }
            }
        }
        summary.unfinished_tracks = self.manager.finish();

        info!(
            complete = self.manager.completed().len(),
            created = self.manager.statistics().tracks_created(),
            rejected = summary.frames_rejected,
            "stream finished"
        );
        Ok(summary)
    }

    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    pub fn manager(&self) -> &TrackManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut TrackManager {
        &mut self.manager
    }
}
