mod classifiers;
mod stub_monitor;
mod vec_stream;

pub use classifiers::{FixedVoteClassifier, OracleClassifier, PanickingClassifier, TrainSpyClassifier};
pub use stub_monitor::StubMonitor;
pub use vec_stream::VecStream;
