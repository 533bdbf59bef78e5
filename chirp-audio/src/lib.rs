pub mod backend;
pub mod events;
mod gate;
mod playback_thread;
pub mod scheduler;
pub mod telemetry;

pub use backend::{
    BackendError, BackendResult, NullBackend, PacedBackend, PlayableUnit, SharedTestBackend,
    SoundBackend, TestBackend, TestOp,
};
pub use events::LifecycleEvent;
pub use gate::GateStatus;
pub use scheduler::Scheduler;
