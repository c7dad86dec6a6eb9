use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Id of the worker scheduled to run. Only that worker can clear it.
#[derive(Default)]
pub struct RunningSignal {
    current: Mutex<Option<u64>>,
    changed: Condvar,
}

impl RunningSignal {
    pub fn new() -> Self {
        Self::default()
    }

    fn current_guard(&self) -> MutexGuard<'_, Option<u64>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn begin(&self, id: u64) {
        *self.current_guard() = Some(id);
        self.changed.notify_all();
    }

    pub fn finish(&self, id: u64) -> bool {
        let mut current = self.current_guard();
        if *current != Some(id) {
            return false;
        }
        *current = None;
        self.changed.notify_all();
        true
    }

    pub fn current(&self) -> Option<u64> {
        *self.current_guard()
    }

    pub fn is_running(&self) -> bool {
        self.current().is_some()
    }

    pub fn is_current(&self, id: u64) -> bool {
        self.current() == Some(id)
    }

    pub fn wait_finished(&self, id: u64, timeout: Duration) -> bool {
        let current = self.current_guard();
        let (current, _) = self
            .changed
            .wait_timeout_while(current, timeout, |current| *current == Some(id))
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current != Some(id)
    }
}
