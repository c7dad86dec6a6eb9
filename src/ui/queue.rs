use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

const IDLE_WAIT: Duration = Duration::from_millis(50);

type Task = Box<dyn FnOnce() + Send + 'static>;

struct Scheduled {
    due: Instant,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct Pending {
    tasks: Vec<Scheduled>,
    next_seq: u64,
}

/// Deferred-callback queue. Any thread may post; only the thread that
/// constructed it runs tasks.
pub struct UiQueue {
    owner: ThreadId,
    pending: Mutex<Pending>,
    wake: Condvar,
    generation: AtomicU64,
}

impl UiQueue {
    pub fn new() -> Self {
        Self {
            owner: thread::current().id(),
            pending: Mutex::new(Pending::default()),
            wake: Condvar::new(),
            generation: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_owner_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    pub fn post(&self, task: impl FnOnce() + Send + 'static) {
        self.post_after(Duration::ZERO, task);
    }

    pub fn post_after(&self, delay: Duration, task: impl FnOnce() + Send + 'static) {
        let mut pending = self.lock();
        let seq = pending.next_seq;
        pending.next_seq += 1;
        pending.tasks.push(Scheduled {
            due: Instant::now() + delay,
            seq,
            task: Box::new(task),
        });
        drop(pending);
        self.wake.notify_all();
    }

    /// Drops every queued task, including ones already picked up by a
    /// `run_pending` batch that has not reached them yet.
    pub fn cancel_pending(&self) -> usize {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut pending = self.lock();
        let cancelled = pending.tasks.len();
        pending.tasks.clear();
        cancelled
    }

    pub fn pending(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn run_pending(&self) -> usize {
        if !self.is_owner_thread() {
            log::warn!("UI queue drained from a foreign thread, ignoring");
            return 0;
        }

        let now = Instant::now();
        let generation = self.generation.load(Ordering::SeqCst);
        let mut due: Vec<Scheduled> = {
            let mut pending = self.lock();
            let (ready, later) = std::mem::take(&mut pending.tasks)
                .into_iter()
                .partition(|t| t.due <= now);
            pending.tasks = later;
            ready
        };
        due.sort_by_key(|t| (t.due, t.seq));

        let mut ran = 0;
        for scheduled in due {
            if self.generation.load(Ordering::SeqCst) != generation {
                break;
            }
            (scheduled.task)();
            ran += 1;
        }
        ran
    }

    pub fn run_until(&self, done: impl FnMut() -> bool) {
        self.run_with_pump(|| {}, done);
    }

    /// The UI loop. `pump` runs once per iteration, between task batches and
    /// idle waits, so native messages for this thread get dispatched too.
    pub fn run_with_pump(&self, mut pump: impl FnMut(), mut done: impl FnMut() -> bool) {
        loop {
            self.run_pending();
            if done() {
                break;
            }
            pump();
            let pending = self.lock();
            let now = Instant::now();
            let timeout = pending
                .tasks
                .iter()
                .map(|t| t.due.saturating_duration_since(now))
                .min()
                .unwrap_or(IDLE_WAIT)
                .min(IDLE_WAIT);
            let _ = self.wake.wait_timeout(pending, timeout);
        }
    }
}

impl Default for UiQueue {
    fn default() -> Self {
        Self::new()
    }
}
