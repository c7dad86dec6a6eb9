use super::guard::NativeHandleGuard;
use super::retry::{RetryOutcome, RetryPolicy};
use super::signal::RunningSignal;
use crate::error::{report, NativeError};
use crate::platform::{IndicatorBackend, LoopRequest, TraySpec};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone)]
pub struct WorkerContext {
    pub backend: Arc<dyn IndicatorBackend>,
    pub running: Arc<RunningSignal>,
    pub spec: TraySpec,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    AlreadyStopped,
    NotStarted,
    Confirmed,
    Unconfirmed,
}

pub struct TrayWorker {
    id: u64,
    guard: Arc<NativeHandleGuard>,
    ctx: WorkerContext,
    started: AtomicBool,
    stopped: AtomicBool,
    stop_requested: AtomicBool,
}

impl TrayWorker {
    pub fn new(id: u64, guard: Arc<NativeHandleGuard>, ctx: WorkerContext) -> Self {
        Self {
            id,
            guard,
            ctx,
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn guard(&self) -> &Arc<NativeHandleGuard> {
        &self.guard
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn run(&self) {
        let _exit = ExitActions(self);

        if !self.ctx.running.is_current(self.id) {
            log::debug!("Tray worker {} was not scheduled to run", self.id);
            return;
        }

        self.stopped.store(false, Ordering::SeqCst);
        self.started.store(true, Ordering::SeqCst);

        if let Err(e) = self.run_native() {
            report(&e, "Tray indicator loop");
        }
    }

    fn run_native(&self) -> Result<(), NativeError> {
        if self.stop_requested.load(Ordering::SeqCst) {
            return Ok(());
        }

        let resource = self.ctx.backend.open(&self.ctx.spec)?;
        if !self.guard.install(resource) {
            let _ = self.ctx.backend.destroy(resource.handle);
            let _ = self.ctx.backend.unregister(resource.class);
            return Err(NativeError::Unavailable("indicator slot already occupied".into()));
        }

        // A stop issued before the handle was published could not post to
        // the loop, so it has to be noticed here.
        if self.stop_requested.load(Ordering::SeqCst) {
            return Ok(());
        }

        log::info!("Tray indicator {} active", self.id);
        self.ctx.backend.run_loop(resource.handle)
    }

    pub fn stop(&self) -> StopOutcome {
        if self.is_stopped() {
            return StopOutcome::AlreadyStopped;
        }
        self.stop_requested.store(true, Ordering::SeqCst);
        if !self.is_started() {
            return StopOutcome::NotStarted;
        }

        if let Some(handle) = self.guard.handle() {
            for request in [LoopRequest::Close, LoopRequest::Quit] {
                if let Err(e) = self.ctx.backend.post(handle, request) {
                    report(&e, "Posting stop request to tray loop");
                }
            }
        }

        let outcome = self.ctx.retry.run(|| {
            if let Err(e) = self.ctx.backend.drain_current_thread() {
                report(&e, "Draining pending messages");
            }
            self.is_stopped()
        });

        match outcome {
            RetryOutcome::Succeeded { .. } => StopOutcome::Confirmed,
            RetryOutcome::Exhausted => {
                log::warn!("Tray worker {} did not confirm exit, continuing", self.id);
                StopOutcome::Unconfirmed
            }
        }
    }
}

/// Runs on every way out of `TrayWorker::run`, including panics in the
/// native backend.
struct ExitActions<'a>(&'a TrayWorker);

impl Drop for ExitActions<'_> {
    fn drop(&mut self) {
        let worker = self.0;
        worker.stopped.store(true, Ordering::SeqCst);
        worker.guard.release(true);
        worker.ctx.running.finish(worker.id);
        log::debug!("Tray worker {} exited", worker.id);
    }
}
