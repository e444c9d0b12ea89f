//! Trait for ordered frame sources.

use crate::integration::frame::RawFrame;

/// An ordered source of raw frames.
///
/// Implement this trait to feed any dataset reader or live receiver into
/// the [`FusionPipeline`](crate::integration::FusionPipeline).
///
/// # Example
///
/// ```ignore
/// use radartrack_rs::{FrameSource, RawFrame};
///
/// struct MyReader {
///     // Your decoder here
/// }
///
/// impl FrameSource for MyReader {
///     type Error = std::io::Error;
///
///     fn next_frame(&mut self) -> Option<Result<RawFrame, Self::Error>> {
///         None
///     }
/// }
/// ```
pub trait FrameSource {
    /// Error type for read failures.
    type Error;

    /// Next frame in timestamp order, or `None` at the end of the stream.
    fn next_frame(&mut self) -> Option<Result<RawFrame, Self::Error>>;
}

/// Frame source over an in-memory iterator.
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    frames: I,
}

impl<I: Iterator<Item = RawFrame>> IterSource<I> {
    pub fn new(frames: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

impl<I: Iterator<Item = RawFrame>> FrameSource for IterSource<I> {
    type Error = std::convert::Infallible;

    fn next_frame(&mut self) -> Option<Result<RawFrame, Self::Error>> {
        self.frames.next().map(Ok)
    }
}
