pub mod engagement;
pub mod lifecycle_daemon;

pub use engagement::EngagementService;
pub use lifecycle_daemon::{
    DaemonHandle, DaemonStatus, LifecycleDaemon, LifecycleDaemonConfig, LifecycleEvent,
    ScanSchedule, StopReason,
};
