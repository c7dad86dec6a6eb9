use anyhow::Result;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tagsnap::coordinator::{
    Callbacks, Command, Coordinator, CoordinatorSettings, CoordinatorState, HotkeyService,
    Platform, Terminator,
};
use tagsnap::error::WidgetError;
use tagsnap::platform::headless::HeadlessIndicator;
use tagsnap::platform::TraySpec;
use tagsnap::tray::RetryPolicy;
use tagsnap::ui::{HeadlessWindow, HostWindow, UiQueue, Widget, WidgetSet};

struct CountingHotkeys(Arc<AtomicUsize>);

impl HotkeyService for CountingHotkeys {
    fn unregister_all(&mut self) -> Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingExit {
    codes: Mutex<Vec<i32>>,
}

impl RecordingExit {
    fn codes(&self) -> Vec<i32> {
        self.codes.lock().unwrap().clone()
    }
}

impl Terminator for RecordingExit {
    fn terminate(&self, code: i32) {
        self.codes.lock().unwrap().push(code);
    }
}

struct FakeWidget {
    name: String,
    alive: AtomicBool,
}

impl FakeWidget {
    fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            alive: AtomicBool::new(true),
        })
    }
}

impl Widget for FakeWidget {
    fn name(&self) -> &str {
        &self.name
    }

    fn exists(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn destroy(&self) -> Result<(), WidgetError> {
        if self.alive.swap(false, Ordering::SeqCst) {
            Ok(())
        } else {
            Err(WidgetError::AlreadyGone)
        }
    }
}

struct Harness {
    coordinator: Arc<Coordinator>,
    backend: Arc<HeadlessIndicator>,
    window: Arc<HeadlessWindow>,
    ui: Arc<UiQueue>,
    shown: Arc<AtomicUsize>,
    quit_callbacks: Arc<AtomicUsize>,
    unregistered: Arc<AtomicUsize>,
    exit: Arc<RecordingExit>,
}

fn fast_settings() -> CoordinatorSettings {
    CoordinatorSettings {
        spec: TraySpec::default(),
        retry: RetryPolicy::new(3, Duration::from_millis(10)),
        topmost_release: Duration::from_millis(20),
        worker_join_timeout: Duration::from_millis(500),
    }
}

fn harness() -> Harness {
    let backend = Arc::new(HeadlessIndicator::new());
    let window = Arc::new(HeadlessWindow::new("test"));
    let ui = Arc::new(UiQueue::new());
    let shown = Arc::new(AtomicUsize::new(0));
    let quit_callbacks = Arc::new(AtomicUsize::new(0));
    let unregistered = Arc::new(AtomicUsize::new(0));
    let exit = Arc::new(RecordingExit::default());

    let platform = Platform {
        indicator: backend.clone(),
        window: window.clone(),
        widgets: Arc::new(WidgetSet::new()),
        hotkeys: Box::new(CountingHotkeys(unregistered.clone())),
        terminator: exit.clone(),
        ui: ui.clone(),
    };
    let shown_counter = shown.clone();
    let quit_counter = quit_callbacks.clone();
    let callbacks = Callbacks::new()
        .on_show(move || {
            shown_counter.fetch_add(1, Ordering::SeqCst);
        })
        .on_quit(move || {
            quit_counter.fetch_add(1, Ordering::SeqCst);
        });

    Harness {
        coordinator: Coordinator::new(platform, callbacks, fast_settings()),
        backend,
        window,
        ui,
        shown,
        quit_callbacks,
        unregistered,
        exit,
    }
}

fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn hide_moves_to_tray_with_live_worker() {
    // Arrange
    let h = harness();

    // Act
    h.coordinator.hide();

    // Assert
    assert_eq!(h.coordinator.state(), CoordinatorState::TrayActive);
    assert!(h.coordinator.worker_alive());
    assert!(!h.window.is_viewable());
    assert!(wait_for(|| h.backend.stats().live_loops == 1));
    assert!(h.coordinator.indicator_resource().is_some());
}

#[test]
fn show_from_tray_stops_worker_and_releases_resource() {
    // Arrange
    let h = harness();
    h.coordinator.hide();
    assert!(wait_for(|| h.backend.stats().live_loops == 1));

    // Act
    h.coordinator.show();

    // Assert
    assert_eq!(h.coordinator.state(), CoordinatorState::WindowVisible);
    assert!(!h.coordinator.worker_alive());
    assert!(h.coordinator.indicator_resource().is_none());
    assert_eq!(h.shown.load(Ordering::SeqCst), 1);
    assert!(h.window.is_viewable());

    let stats = h.backend.stats();
    assert_eq!(stats.live_loops, 0);
    assert_eq!(stats.open_windows, 0);
    assert_eq!(stats.registered_classes, 0);
}

#[test]
fn hide_twice_leaves_exactly_one_worker() {
    // Arrange
    let h = harness();
    h.coordinator.hide();
    assert!(wait_for(|| h.backend.stats().live_loops == 1));

    // Act
    h.coordinator.hide();

    // Assert
    assert_eq!(h.coordinator.state(), CoordinatorState::TrayActive);
    assert!(wait_for(|| {
        let stats = h.backend.stats();
        stats.opened == 2 && stats.live_loops == 1
    }));
    let stats = h.backend.stats();
    assert_eq!(stats.live_loops, 1);
    assert_eq!(stats.peak_live_loops, 1);
    assert_eq!(stats.open_windows, 1);
}

#[test]
fn quit_from_foreign_thread_stops_worker_then_cleans_up_on_owner() {
    // Arrange
    let h = harness();
    h.coordinator.hide();
    assert!(wait_for(|| h.backend.stats().live_loops == 1));

    // Act
    let coordinator = h.coordinator.clone();
    thread::spawn(move || coordinator.quit()).join().unwrap();

    // Assert
    assert!(!h.coordinator.worker_alive());
    assert_eq!(h.backend.stats().live_loops, 0);
    assert_eq!(h.exit.codes(), Vec::<i32>::new());
    assert_eq!(h.quit_callbacks.load(Ordering::SeqCst), 0);

    h.ui.run_pending();
    h.ui.run_pending();

    assert_eq!(h.quit_callbacks.load(Ordering::SeqCst), 1);
    assert_eq!(h.exit.codes(), vec![0]);
}

#[test]
fn ui_loop_outlasts_a_slow_quit_from_another_thread() {
    // Arrange
    let h = harness();
    h.coordinator.hide();
    assert!(wait_for(|| h.backend.stats().live_loops == 1));
    h.backend.set_unresponsive(true);
    let coordinator = h.coordinator.clone();
    let quitter = thread::spawn(move || coordinator.quit());

    // Act
    h.coordinator.run_until_exit();

    // Assert
    quitter.join().unwrap();
    assert!(h.coordinator.is_cleaned_up());
    assert_eq!(h.quit_callbacks.load(Ordering::SeqCst), 1);
    assert_eq!(h.unregistered.load(Ordering::SeqCst), 1);
    assert!(h.window.is_destroyed());
    assert_eq!(h.exit.codes(), vec![0]);
}

#[test]
fn ui_loop_pumps_native_messages_while_idle() {
    // Arrange
    let h = harness();
    let coordinator = h.coordinator.clone();
    let quitter = thread::spawn(move || {
        thread::sleep(Duration::from_millis(120));
        coordinator.quit();
    });

    // Act
    h.coordinator.run_until_exit();

    // Assert
    quitter.join().unwrap();
    assert!(h.backend.stats().drains >= 2);
    assert_eq!(h.exit.codes(), vec![0]);
}

#[test]
fn quit_is_idempotent_and_terminal() {
    // Arrange
    let h = harness();
    h.coordinator.quit();
    let opened = h.backend.stats().opened;

    // Act
    h.coordinator.quit();
    h.coordinator.hide();
    h.coordinator.show();
    h.coordinator.request(Command::Hide);
    h.ui.run_pending();

    // Assert
    assert_eq!(h.coordinator.state(), CoordinatorState::Exiting);
    assert_eq!(h.backend.stats().opened, opened);
    assert_eq!(h.shown.load(Ordering::SeqCst), 0);
    assert_eq!(h.quit_callbacks.load(Ordering::SeqCst), 1);
    assert_eq!(h.unregistered.load(Ordering::SeqCst), 1);
    assert_eq!(h.exit.codes(), vec![0]);
}

#[test]
fn cleanup_tears_down_every_ui_element() {
    // Arrange
    let h = harness();
    let widgets = [FakeWidget::new("tag list"), FakeWidget::new("preview"), FakeWidget::new("status")];
    for widget in &widgets {
        h.coordinator.widgets().track(widget.clone());
    }
    widgets[1].destroy().unwrap();
    h.coordinator.show();
    assert!(h.ui.pending() > 0);

    // Act
    h.coordinator.quit();

    // Assert
    assert!(h.coordinator.widgets().all_gone());
    assert!(h.window.is_destroyed());
    assert_eq!(h.ui.pending(), 0);
    assert_eq!(h.unregistered.load(Ordering::SeqCst), 1);
    assert_eq!(h.exit.codes(), vec![0]);
}

#[test]
fn concurrent_transitions_never_overlap_workers() {
    // Arrange
    let h = harness();
    let opened_at_quit = Arc::new(Mutex::new(None));
    let threads: Vec<_> = (0..4)
        .map(|i| {
            let coordinator = h.coordinator.clone();
            let backend = h.backend.clone();
            let opened_at_quit = opened_at_quit.clone();
            thread::spawn(move || {
                for round in 0..10 {
                    if i == 0 && round == 5 {
                        coordinator.quit();
                        *opened_at_quit.lock().unwrap() = Some(backend.stats().opened);
                    } else if (i + round) % 2 == 0 {
                        coordinator.hide();
                    } else {
                        coordinator.show();
                    }
                }
            })
        })
        .collect();

    // Act
    for thread in threads {
        thread.join().unwrap();
    }
    h.ui.run_pending();

    // Assert
    let stats = h.backend.stats();
    assert!(stats.peak_live_loops <= 1, "peak was {}", stats.peak_live_loops);
    assert_eq!(stats.live_loops, 0);
    assert_eq!(stats.open_windows, 0);
    assert_eq!(Some(stats.opened), *opened_at_quit.lock().unwrap());
    assert_eq!(h.coordinator.state(), CoordinatorState::Exiting);
    assert_eq!(h.quit_callbacks.load(Ordering::SeqCst), 1);
    assert_eq!(h.exit.codes(), vec![0]);
}

#[test]
fn repeated_round_trips_leave_no_native_leftovers() {
    // Arrange
    let h = harness();

    // Act
    for _ in 0..5 {
        h.coordinator.hide();
        h.coordinator.show();
    }

    // Assert
    let stats = h.backend.stats();
    assert_eq!(h.shown.load(Ordering::SeqCst), 5);
    assert_eq!(stats.live_loops, 0);
    assert_eq!(stats.open_windows, 0);
    assert_eq!(stats.registered_classes, 0);
    assert_eq!(stats.peak_live_loops, 1);
}

#[test]
fn show_returns_promptly_when_loop_ignores_requests() {
    // Arrange
    let h = harness();
    h.coordinator.hide();
    assert!(wait_for(|| h.backend.stats().live_loops == 1));
    h.backend.set_unresponsive(true);

    // Act
    let started = Instant::now();
    h.coordinator.show();

    // Assert
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(h.coordinator.state(), CoordinatorState::WindowVisible);
    assert!(h.coordinator.indicator_resource().is_none());
    assert!(wait_for(|| {
        let stats = h.backend.stats();
        stats.live_loops == 0 && stats.open_windows == 0 && stats.registered_classes == 0
    }));
}

#[test]
fn topmost_is_cleared_after_release_delay() {
    // Arrange
    let h = harness();
    h.coordinator.hide();

    // Act
    h.coordinator.show();
    let raised = h.window.is_topmost();
    thread::sleep(Duration::from_millis(60));
    h.ui.run_pending();

    // Assert
    assert!(raised);
    assert!(!h.window.is_topmost());
    assert!(h.window.focus_count() >= 1);
}

#[test]
fn close_request_hides_visible_window() {
    // Arrange
    let h = harness();

    // Act
    h.coordinator.on_close_requested();

    // Assert
    assert_eq!(h.coordinator.state(), CoordinatorState::TrayActive);
    assert!(!h.window.is_viewable());
    assert!(h.coordinator.worker_alive());
}

#[test]
fn focus_on_window_restored_elsewhere_drops_indicator() {
    // Arrange
    let h = harness();
    h.coordinator.hide();
    assert!(wait_for(|| h.backend.stats().live_loops == 1));
    h.window.restore().unwrap();

    // Act
    h.coordinator.on_focus_gained();

    // Assert
    assert!(h.coordinator.is_visibility_acknowledged());
    assert_eq!(h.coordinator.state(), CoordinatorState::WindowVisible);
    assert!(!h.coordinator.worker_alive());
    assert_eq!(h.backend.stats().live_loops, 0);
}

#[test]
fn requests_from_other_threads_run_on_owner() {
    // Arrange
    let h = harness();
    let coordinator = h.coordinator.clone();

    // Act
    thread::spawn(move || coordinator.request(Command::Hide)).join().unwrap();
    let before = h.coordinator.state();
    h.ui.run_pending();

    // Assert
    assert_eq!(before, CoordinatorState::WindowVisible);
    assert_eq!(h.coordinator.state(), CoordinatorState::TrayActive);
}
