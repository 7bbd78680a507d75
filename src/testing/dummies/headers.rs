use crate::core::{Example, StreamHeader};
use std::sync::Arc;

pub fn header_binary() -> Arc<StreamHeader> {
    Arc::new(StreamHeader::new(
        "bin".into(),
        vec!["x".into()],
        vec!["A".into(), "B".into()],
    ))
}

pub fn header_three_class() -> Arc<StreamHeader> {
    Arc::new(StreamHeader::new(
        "tri".into(),
        vec!["x".into(), "y".into()],
        vec!["A".into(), "B".into(), "C".into()],
    ))
}

/// Unit-weight example over `header`. Panics on a shape mismatch.
pub fn example<const N: usize>(header: &Arc<StreamHeader>, features: [f64; N], class: usize) -> Example {
    Example::new(Arc::clone(header), features.to_vec(), class, 1.0)
        .expect("dummy example must match its header")
}
