pub mod classifiers;
pub mod core;
pub mod drift;
pub mod ensemble;
pub mod evaluation;
pub mod streams;
pub mod utils;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;
