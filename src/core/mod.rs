pub mod estimators;
mod example;
mod stream_header;

pub use example::{Example, ExampleError, WeightedExample};
pub use stream_header::StreamHeader;
