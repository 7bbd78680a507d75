pub mod dummies;
pub mod stubs;

pub use stubs::{
    FixedVoteClassifier, OracleClassifier, PanickingClassifier, StubMonitor, TrainSpyClassifier,
    VecStream,
};
