mod adwin;
mod drift_monitor;

pub use adwin::Adwin;
pub use drift_monitor::DriftMonitor;
