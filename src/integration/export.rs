//! Serializable output documents and selection of completed tracks.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tracker::{TrackManager, TrackRecord};

/// The completed-tracks document: `{"tracks": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TracksDocument {
    pub tracks: Vec<TrackRecord>,
}

impl TracksDocument {
    pub fn from_manager(manager: &TrackManager) -> Self {
        Self {
            tracks: manager.completed_tracks(),
        }
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Whether idle samples are required, forbidden or irrelevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopFilter {
    #[default]
    Any,
    With,
    Without,
}

/// Selection of completed records by road, category and stops.
/// Empty sets accept everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFilter {
    pub roads: BTreeSet<String>,
    pub types: BTreeSet<String>,
    pub stops: StopFilter,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn road(mut self, road: impl Into<String>) -> Self {
        self.roads.insert(road.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.types.insert(category.into());
        self
    }

    pub fn stops(mut self, stops: StopFilter) -> Self {
        self.stops = stops;
        self
    }

    pub fn matches(&self, record: &TrackRecord) -> bool {
        if !self.roads.is_empty() && !self.roads.contains(&record.road) {
            return false;
        }
        if !self.types.is_empty() && !self.types.contains(&record.category) {
            return false;
        }
        match self.stops {
            StopFilter::Any => true,
            StopFilter::With => record.has_stops(),
            StopFilter::Without => !record.has_stops(),
        }
    }

    pub fn select<'a>(&self, records: &'a [TrackRecord]) -> Vec<&'a TrackRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

impl fmt::Display for TrackRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Track {}: {} at road {} {:.1} m long with {}/{} stops",
            self.id,
            self.category,
            self.road,
            self.length,
            self.idle_count,
            self.sample_count()
        )
    }
}
