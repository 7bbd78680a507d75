use crate::core::{Example, StreamHeader};
use std::io::Error;
use std::sync::Arc;

/// Pull-based source of labeled examples.
///
/// Implementations may be finite (replayed datasets) or unbounded
/// (generators). Every example yielded shares the stream's header.
pub trait Stream {
    /// Schema of every example this stream produces. It never changes over
    /// the lifetime of the stream.
    fn header(&self) -> &Arc<StreamHeader>;

    /// Whether the stream *may* produce more examples. Once this returns
    /// `false`, [`Stream::next_instance`] returns `None`.
    fn has_more_instances(&self) -> bool;

    /// Next example, or `None` when the stream is exhausted.
    fn next_instance(&mut self) -> Option<Example>;

    /// Rewinds the stream to its initial state. Generators re-seed.
    fn restart(&mut self) -> Result<(), Error>;
}
