mod region;
mod statistics;
mod track;
mod track_manager;
mod track_state;
mod validator;

pub use region::RegionOfInterest;
pub use statistics::{LengthSummary, RunMetadata, RunStatistics};
pub use track::{Track, TrackKey, TrackRecord};
pub use track_manager::{TrackManager, TrackManagerConfig, UpdateSummary};
pub use track_state::TrackState;
pub use validator::TrackValidator;
