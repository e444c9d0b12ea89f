mod detection;
mod filter;
mod merge;
mod sensor;
mod transform;

pub use detection::{Detection, GlobalDetection};
pub use filter::{DetectionFilter, FilterConfig};
pub use merge::{DetectionMerger, MergePair, PairAssignment, distance_matrix, greedy_assignment};
pub use sensor::{SensorConfig, SensorRegistry, UNKNOWN_ROAD, road_label};
pub use transform::CoordinateTransformer;
