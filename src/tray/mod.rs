pub mod guard;
pub mod retry;
pub mod signal;
pub mod worker;

pub use guard::{NativeHandleGuard, ReleaseOutcome};
pub use retry::{RetryOutcome, RetryPolicy};
pub use signal::RunningSignal;
pub use worker::{StopOutcome, TrayWorker, WorkerContext};
