mod host;
mod state;

pub use host::{Callbacks, HotkeyService, NoHotkeys, Platform, ProcessExit, Terminator};
pub use state::{Command, CoordinatorState};

use crate::error::report;
use crate::platform::{IndicatorBackend, NativeIconResource, TraySpec};
use crate::tray::{NativeHandleGuard, RetryPolicy, RunningSignal, TrayWorker, WorkerContext};
use crate::ui::{HostWindow, UiQueue, WidgetSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub spec: TraySpec,
    pub retry: RetryPolicy,
    pub topmost_release: Duration,
    pub worker_join_timeout: Duration,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            spec: TraySpec::default(),
            retry: RetryPolicy::default(),
            topmost_release: Duration::from_millis(200),
            worker_join_timeout: Duration::from_millis(500),
        }
    }
}

struct Activation {
    worker: Arc<TrayWorker>,
    thread: Option<JoinHandle<()>>,
}

struct Transition {
    state: CoordinatorState,
    activation: Option<Activation>,
}

pub struct Coordinator {
    transition: Mutex<Transition>,
    exiting: Arc<AtomicBool>,
    cleaned_up: AtomicBool,
    visibility_acknowledged: AtomicBool,
    running: Arc<RunningSignal>,
    next_worker_id: AtomicU64,
    settings: CoordinatorSettings,
    backend: Arc<dyn IndicatorBackend>,
    window: Arc<dyn HostWindow>,
    widgets: Arc<WidgetSet>,
    hotkeys: Mutex<Box<dyn HotkeyService>>,
    terminator: Arc<dyn Terminator>,
    ui: Arc<UiQueue>,
    callbacks: Callbacks,
}

impl Coordinator {
    pub fn new(platform: Platform, callbacks: Callbacks, settings: CoordinatorSettings) -> Arc<Self> {
        Arc::new(Self {
            transition: Mutex::new(Transition {
                state: CoordinatorState::WindowVisible,
                activation: None,
            }),
            exiting: Arc::new(AtomicBool::new(false)),
            cleaned_up: AtomicBool::new(false),
            visibility_acknowledged: AtomicBool::new(false),
            running: Arc::new(RunningSignal::new()),
            next_worker_id: AtomicU64::new(0),
            settings,
            backend: platform.indicator,
            window: platform.window,
            widgets: platform.widgets,
            hotkeys: Mutex::new(platform.hotkeys),
            terminator: platform.terminator,
            ui: platform.ui,
            callbacks,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Transition> {
        self.transition.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> CoordinatorState {
        if self.is_exiting() {
            return CoordinatorState::Exiting;
        }
        self.lock().state
    }

    pub fn is_exiting(&self) -> bool {
        self.exiting.load(Ordering::SeqCst)
    }

    pub fn exiting_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.exiting)
    }

    pub fn worker_alive(&self) -> bool {
        self.running.is_running()
    }

    pub fn indicator_resource(&self) -> Option<NativeIconResource> {
        self.lock()
            .activation
            .as_ref()
            .and_then(|a| a.worker.guard().resource())
    }

    pub fn is_visibility_acknowledged(&self) -> bool {
        self.visibility_acknowledged.load(Ordering::SeqCst)
    }

    pub fn widgets(&self) -> &Arc<WidgetSet> {
        &self.widgets
    }

    pub fn ui(&self) -> &Arc<UiQueue> {
        &self.ui
    }

    pub fn is_cleaned_up(&self) -> bool {
        self.cleaned_up.load(Ordering::SeqCst)
    }

    /// The UI thread's main loop. Returns once quit cleanup has run, and
    /// pumps the thread's native messages while it waits.
    pub fn run_until_exit(&self) {
        self.ui.run_with_pump(
            || {
                if let Err(e) = self.backend.drain_current_thread() {
                    report(&e, "Pumping UI thread messages");
                }
            },
            || self.is_cleaned_up(),
        );
    }

    pub fn hide(&self) {
        if self.is_exiting() {
            log::debug!("Ignoring hide, application is exiting");
            return;
        }
        let mut transition = self.lock();
        if self.is_exiting() {
            return;
        }

        if let Some(activation) = transition.activation.take() {
            self.retire(activation);
        }

        if let Err(e) = self.window.withdraw() {
            log::warn!("Failed to withdraw window: {}", e);
        }

        match self.spawn_worker() {
            Ok(activation) => {
                transition.activation = Some(activation);
                transition.state = CoordinatorState::TrayActive;
                log::info!("Window hidden to tray");
            }
            Err(e) => {
                log::error!("Failed to start tray worker: {}", e);
                if let Err(e) = self.window.restore() {
                    log::warn!("Failed to restore window: {}", e);
                }
                transition.state = CoordinatorState::WindowVisible;
            }
        }
    }

    pub fn show(&self) {
        if self.is_exiting() {
            log::debug!("Ignoring show, application is exiting");
            return;
        }
        let mut transition = self.lock();
        if self.is_exiting() {
            return;
        }

        match transition.activation.take() {
            Some(activation) => self.retire(activation),
            None => log::debug!("No tray worker to stop"),
        }

        self.present_window();
        self.visibility_acknowledged.store(false, Ordering::SeqCst);
        transition.state = CoordinatorState::WindowVisible;
        log::info!("Window restored from tray");

        if let Some(callback) = &self.callbacks.show {
            callback();
        }
    }

    /// Begins shutdown. Safe from any thread; UI teardown always runs on the
    /// thread that owns the UI queue.
    pub fn quit(self: &Arc<Self>) {
        if self.exiting.swap(true, Ordering::SeqCst) {
            log::debug!("Quit already in progress");
            return;
        }
        log::info!("Quit requested");

        self.stop_for_exit();

        if self.ui.is_owner_thread() {
            self.perform_cleanup();
        } else {
            let this = Arc::clone(self);
            self.ui.post(move || this.perform_cleanup());
        }
    }

    pub fn request(self: &Arc<Self>, command: Command) {
        match command {
            Command::Quit => self.quit(),
            command if self.ui.is_owner_thread() => self.apply(command),
            command => {
                let this = Arc::clone(self);
                self.ui.post(move || this.apply(command));
            }
        }
    }

    fn apply(self: &Arc<Self>, command: Command) {
        match command {
            Command::Show => self.show(),
            Command::Hide => self.hide(),
            Command::Quit => self.quit(),
        }
    }

    /// Close button: hide to tray if the window is showing, otherwise make
    /// sure it stays withdrawn.
    pub fn on_close_requested(&self) {
        if self.window.is_viewable() {
            self.hide();
        } else if let Err(e) = self.window.withdraw() {
            log::warn!("Failed to withdraw window: {}", e);
        }
    }

    /// The window got focus. If it became visible behind the coordinator's
    /// back while the indicator is still up, drop the indicator.
    pub fn on_focus_gained(&self) {
        self.visibility_acknowledged.store(true, Ordering::SeqCst);
        if self.is_exiting() || !self.window.is_viewable() || !self.running.is_running() {
            return;
        }

        let mut transition = self.lock();
        if self.is_exiting() {
            return;
        }
        if let Some(activation) = transition.activation.take() {
            self.retire(activation);
            transition.state = CoordinatorState::WindowVisible;
            log::info!("Window visible again, tray indicator removed");
        }
    }

    fn worker_context(&self) -> WorkerContext {
        WorkerContext {
            backend: Arc::clone(&self.backend),
            running: Arc::clone(&self.running),
            spec: self.settings.spec.clone(),
            retry: self.settings.retry,
        }
    }

    fn spawn_worker(&self) -> std::io::Result<Activation> {
        let id = self.next_worker_id.fetch_add(1, Ordering::SeqCst) + 1;
        let guard = Arc::new(NativeHandleGuard::new(Arc::clone(&self.backend)));
        let worker = Arc::new(TrayWorker::new(id, guard, self.worker_context()));

        self.running.begin(id);
        let runner = Arc::clone(&worker);
        let spawned = thread::Builder::new()
            .name(format!("tray-worker-{}", id))
            .spawn(move || runner.run());

        match spawned {
            Ok(thread) => Ok(Activation {
                worker,
                thread: Some(thread),
            }),
            Err(e) => {
                self.running.finish(id);
                Err(e)
            }
        }
    }

    fn retire(&self, activation: Activation) {
        let Activation { worker, thread } = activation;
        let id = worker.id();

        let outcome = worker.stop();
        log::debug!("Stopped tray worker {}: {:?}", id, outcome);

        let finished = self
            .running
            .wait_finished(id, self.settings.worker_join_timeout);
        let released = worker.guard().release(worker.is_stopped());
        if released.unexpected_failures > 0 {
            log::warn!(
                "Tray worker {} released with {} teardown failure(s)",
                id,
                released.unexpected_failures
            );
        }

        match thread {
            Some(thread) if finished => {
                if thread.join().is_err() {
                    log::error!("Tray worker {} panicked", id);
                }
            }
            Some(_) => log::warn!(
                "Tray worker {} still running after {:?}, detaching",
                id,
                self.settings.worker_join_timeout
            ),
            None => {}
        }
    }

    fn present_window(&self) {
        let window = &self.window;
        if !window.is_viewable() {
            if let Err(e) = window.restore() {
                log::warn!("Failed to restore window: {}", e);
            }
        }

        let steps = [
            ("set topmost", window.set_topmost(true)),
            ("focus", window.focus()),
            ("raise", window.raise()),
        ];
        for (step, result) in steps {
            if let Err(e) = result {
                log::warn!("Failed to {} window: {}", step, e);
            }
        }

        let window = Arc::clone(&self.window);
        let exiting = Arc::clone(&self.exiting);
        self.ui.post_after(self.settings.topmost_release, move || {
            if exiting.load(Ordering::SeqCst) {
                return;
            }
            if let Err(e) = window.set_topmost(false) {
                log::debug!("Failed to clear topmost: {}", e);
            }
        });
    }

    fn stop_for_exit(&self) {
        let mut transition = self.lock();
        if let Some(activation) = transition.activation.take() {
            self.retire(activation);
        }
        transition.state = CoordinatorState::Exiting;
    }

    fn perform_cleanup(&self) {
        if self.cleaned_up.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(callback) = &self.callbacks.quit {
            callback();
        }

        {
            let mut hotkeys = self.hotkeys.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Err(e) = hotkeys.unregister_all() {
                log::warn!("Failed to unregister hotkeys: {}", e);
            }
        }

        let cancelled = self.ui.cancel_pending();
        if cancelled > 0 {
            log::debug!("Cancelled {} pending UI callback(s)", cancelled);
        }

        let report = self.widgets.destroy_all();
        log::debug!("Widget teardown: {:?}", report);

        if let Err(e) = self.window.destroy() {
            log::debug!("Root window teardown: {}", e);
        }

        self.terminator.terminate(0);
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        let activation = self.lock().activation.take();
        if let Some(activation) = activation {
            self.retire(activation);
        }
    }
}
