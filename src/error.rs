use thiserror::Error;

/// Errors raised while configuring or running the fusion pipeline.
///
/// Configuration variants (`DegenerateRegion`, `EmptySensorList`,
/// `InvalidConfig`) are fatal at construction. The others are scoped to a
/// single detection, frame or query and leave the stream running.
#[derive(Debug, Error)]
pub enum FusionError {
    #[error("detection is missing required field `{field}`")]
    FieldMissing { field: &'static str },

    #[error("frame timestamp {current} does not follow previous timestamp {previous}")]
    NonMonotonicTimestamp { previous: f64, current: f64 },

    #[error("no valid tracks have been finalized yet")]
    EmptyDataset,

    #[error("region of interest needs at least 3 vertices, got {vertices}")]
    DegenerateRegion { vertices: usize },

    #[error("no active sensor configuration")]
    EmptySensorList,

    #[error("sensor `{name}` resolved to {matches} configurations, expected exactly one")]
    UnresolvedSensor { name: String, matches: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FusionError {
    /// Whether the error only affects the current detection, frame or query.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FusionError::FieldMissing { .. }
                | FusionError::NonMonotonicTimestamp { .. }
                | FusionError::EmptyDataset
                | FusionError::UnresolvedSensor { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FusionError>;
