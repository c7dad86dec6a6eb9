use crate::error::{report, NativeError, Severity};
use crate::platform::{Disposal, IndicatorBackend, LoopRequest, NativeHandle, NativeIconResource};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseOutcome {
    pub released: bool,
    pub unexpected_failures: usize,
}

#[derive(Default)]
struct Slot {
    live: Option<NativeIconResource>,
    // Window handed to its owning thread for teardown; the class is
    // unregistered on the next release once that thread is done with it.
    deferred: Option<NativeIconResource>,
}

/// Owns the indicator's native handle and class token for one activation.
/// `release` is safe to call any number of times from any thread.
pub struct NativeHandleGuard {
    backend: Arc<dyn IndicatorBackend>,
    slot: Mutex<Slot>,
}

impl NativeHandleGuard {
    pub fn new(backend: Arc<dyn IndicatorBackend>) -> Self {
        Self {
            backend,
            slot: Mutex::new(Slot::default()),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns false and leaves the slot untouched if it is already occupied.
    pub fn install(&self, resource: NativeIconResource) -> bool {
        let mut slot = self.slot();
        if slot.live.is_some() || slot.deferred.is_some() {
            return false;
        }
        slot.live = Some(resource);
        true
    }

    pub fn resource(&self) -> Option<NativeIconResource> {
        self.slot().live
    }

    pub fn handle(&self) -> Option<NativeHandle> {
        self.resource().map(|r| r.handle)
    }

    pub fn is_empty(&self) -> bool {
        let slot = self.slot();
        slot.live.is_none() && slot.deferred.is_none()
    }

    pub fn has_deferred_teardown(&self) -> bool {
        self.slot().deferred.is_some()
    }

    pub fn release(&self, loop_stopped: bool) -> ReleaseOutcome {
        let mut slot = self.slot();
        let (resource, released) = match (slot.live.take(), slot.deferred.take()) {
            (Some(resource), _) => (resource, true),
            (None, Some(resource)) => (resource, false),
            (None, None) => return ReleaseOutcome::default(),
        };

        let mut outcome = ReleaseOutcome {
            released,
            unexpected_failures: 0,
        };
        let mut check = |result: Result<(), NativeError>, context: &'static str| {
            if let Err(e) = result {
                if report(&e, context) == Severity::Unexpected {
                    outcome.unexpected_failures += 1;
                }
            }
        };

        if released && !loop_stopped {
            check(
                self.backend.post(resource.handle, LoopRequest::Close),
                "Posting close to indicator",
            );
        }

        match self.backend.destroy(resource.handle) {
            Ok(Disposal::Deferred) => {
                log::debug!("Indicator {:?} closes on its own thread", resource.handle);
                slot.deferred = Some(resource);
                return outcome;
            }
            Ok(Disposal::Destroyed) => {}
            Err(e) => check(Err(e), "Destroying indicator window"),
        }
        check(self.backend.unregister(resource.class), "Unregistering indicator class");

        log::debug!("Released indicator resource {:?}", resource);
        outcome
    }
}
