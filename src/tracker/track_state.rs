/// Track state enumeration for the track lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Seen this frame, or missing for no more than `max_missing` frames
    #[default]
    Active,
    /// Missing for more than `max_missing` frames, awaiting validation
    Finalized,
    /// Finalized, long enough and ending inside the region of interest
    Valid,
    /// Finalized but rejected by the validator
    Invalid,
}

impl TrackState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TrackState::Valid | TrackState::Invalid)
    }
}
