use super::{
    ClassToken, Disposal, IndicatorBackend, LoopRequest, NativeHandle, NativeIconResource, TraySpec,
};
use crate::error::NativeError;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard};

const ERROR_CLASS_DOES_NOT_EXIST: u32 = 1411;
const ERROR_CLASS_HAS_WINDOWS: u32 = 1412;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadlessStats {
    pub opened: usize,
    pub live_loops: usize,
    pub peak_live_loops: usize,
    pub destroyed: usize,
    pub unregistered: usize,
    pub open_windows: usize,
    pub registered_classes: usize,
    pub drains: usize,
}

enum Envelope {
    Request(LoopRequest),
    Destroy,
}

struct SimWindow {
    class: ClassToken,
    tx: Sender<Envelope>,
    rx: Option<Receiver<Envelope>>,
    looping: bool,
}

#[derive(Default)]
struct Faults {
    open: Option<NativeError>,
    run_loop: Option<NativeError>,
    destroy: Option<NativeError>,
    unregister: Option<NativeError>,
}

#[derive(Default)]
struct Registry {
    next_handle: isize,
    next_class: u16,
    windows: HashMap<NativeHandle, SimWindow>,
    classes: HashSet<ClassToken>,
    faults: Faults,
    stats: HeadlessStats,
}

impl Registry {
    fn refresh_counts(&mut self) {
        self.stats.open_windows = self.windows.len();
        self.stats.registered_classes = self.classes.len();
    }
}

#[derive(Default)]
pub struct HeadlessIndicator {
    registry: Mutex<Registry>,
    unresponsive: AtomicBool,
}

impl HeadlessIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn stats(&self) -> HeadlessStats {
        self.registry().stats
    }

    /// While set, running loops ignore close and quit requests. Destroying
    /// the window still ends the loop.
    pub fn set_unresponsive(&self, unresponsive: bool) {
        self.unresponsive.store(unresponsive, Ordering::SeqCst);
    }

    pub fn fail_next_open(&self, error: NativeError) {
        self.registry().faults.open = Some(error);
    }

    pub fn fail_next_loop(&self, error: NativeError) {
        self.registry().faults.run_loop = Some(error);
    }

    pub fn fail_next_destroy(&self, error: NativeError) {
        self.registry().faults.destroy = Some(error);
    }

    pub fn fail_next_unregister(&self, error: NativeError) {
        self.registry().faults.unregister = Some(error);
    }

    fn end_loop(&self, handle: NativeHandle, self_destroyed: bool) {
        let mut registry = self.registry();
        registry.stats.live_loops = registry.stats.live_loops.saturating_sub(1);
        if self_destroyed {
            if registry.windows.remove(&handle).is_some() {
                registry.stats.destroyed += 1;
            }
        } else if let Some(window) = registry.windows.get_mut(&handle) {
            window.looping = false;
        }
        registry.refresh_counts();
    }
}

impl IndicatorBackend for HeadlessIndicator {
    fn open(&self, spec: &TraySpec) -> Result<NativeIconResource, NativeError> {
        let mut registry = self.registry();
        if let Some(error) = registry.faults.open.take() {
            return Err(error);
        }

        registry.next_handle += 1;
        registry.next_class = registry.next_class.wrapping_add(1).max(1);
        let handle = NativeHandle(registry.next_handle);
        let class = ClassToken(registry.next_class);

        let (tx, rx) = mpsc::channel();
        let window = SimWindow {
            class,
            tx,
            rx: Some(rx),
            looping: false,
        };
        registry.windows.insert(handle, window);
        registry.classes.insert(class);
        registry.stats.opened += 1;
        registry.refresh_counts();

        log::debug!("Opened headless indicator {:?} ({})", handle, spec.tooltip);
        Ok(NativeIconResource { handle, class })
    }

    fn run_loop(&self, handle: NativeHandle) -> Result<(), NativeError> {
        let rx = {
            let mut registry = self.registry();
            if let Some(error) = registry.faults.run_loop.take() {
                return Err(error);
            }
            let window = registry
                .windows
                .get_mut(&handle)
                .ok_or(NativeError::InvalidHandle)?;
            let rx = window.rx.take().ok_or(NativeError::LoopAlreadyRunning)?;
            window.looping = true;
            registry.stats.live_loops += 1;
            registry.stats.peak_live_loops =
                registry.stats.peak_live_loops.max(registry.stats.live_loops);
            rx
        };

        loop {
            match rx.recv() {
                Ok(Envelope::Destroy) => {
                    self.end_loop(handle, true);
                    return Ok(());
                }
                Ok(Envelope::Request(request)) if self.unresponsive.load(Ordering::SeqCst) => {
                    log::debug!("Headless loop {:?} ignoring {:?}", handle, request);
                }
                Ok(Envelope::Request(LoopRequest::Close)) => {
                    self.end_loop(handle, true);
                    return Ok(());
                }
                Ok(Envelope::Request(LoopRequest::Quit)) | Err(_) => {
                    self.end_loop(handle, false);
                    return Ok(());
                }
            }
        }
    }

    fn post(&self, handle: NativeHandle, request: LoopRequest) -> Result<(), NativeError> {
        let registry = self.registry();
        let window = registry.windows.get(&handle).ok_or(NativeError::InvalidHandle)?;
        // A queue nobody reads any more still accepts posts.
        let _ = window.tx.send(Envelope::Request(request));
        Ok(())
    }

    fn drain_current_thread(&self) -> Result<usize, NativeError> {
        self.registry().stats.drains += 1;
        Ok(0)
    }

    fn destroy(&self, handle: NativeHandle) -> Result<Disposal, NativeError> {
        let mut registry = self.registry();
        if let Some(error) = registry.faults.destroy.take() {
            return Err(error);
        }
        let window = registry.windows.get(&handle).ok_or(NativeError::InvalidHandle)?;
        if window.looping {
            // Only the loop's own thread can tear the window down.
            let _ = window.tx.send(Envelope::Destroy);
            return Ok(Disposal::Deferred);
        }

        registry.windows.remove(&handle);
        registry.stats.destroyed += 1;
        registry.refresh_counts();
        Ok(Disposal::Destroyed)
    }

    fn unregister(&self, class: ClassToken) -> Result<(), NativeError> {
        let mut registry = self.registry();
        if let Some(error) = registry.faults.unregister.take() {
            return Err(error);
        }
        if registry.windows.values().any(|window| window.class == class) {
            return Err(NativeError::Os {
                op: "UnregisterClass",
                code: ERROR_CLASS_HAS_WINDOWS,
            });
        }
        if !registry.classes.remove(&class) {
            return Err(NativeError::Os {
                op: "UnregisterClass",
                code: ERROR_CLASS_DOES_NOT_EXIST,
            });
        }
        registry.stats.unregistered += 1;
        registry.refresh_counts();
        Ok(())
    }
}
