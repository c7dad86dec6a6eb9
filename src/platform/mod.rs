pub mod headless;
pub mod icon;

#[cfg(target_os = "windows")]
mod windows;

use crate::error::NativeError;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle(pub isize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassToken(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeIconResource {
    pub handle: NativeHandle,
    pub class: ClassToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopRequest {
    Close,
    Quit,
}

/// Result of a successful `destroy`. A window owned by another thread can
/// only be asked to close; its class stays registered until that thread
/// has torn it down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposal {
    Destroyed,
    Deferred,
}

#[derive(Debug, Clone)]
pub struct TraySpec {
    pub tooltip: String,
}

impl Default for TraySpec {
    fn default() -> Self {
        Self {
            tooltip: "TagSnap".to_string(),
        }
    }
}

pub trait IndicatorBackend: Send + Sync {
    fn open(&self, spec: &TraySpec) -> Result<NativeIconResource, NativeError>;

    /// Blocks until a close or quit request reaches the handle's queue.
    fn run_loop(&self, handle: NativeHandle) -> Result<(), NativeError>;

    fn post(&self, handle: NativeHandle, request: LoopRequest) -> Result<(), NativeError>;

    fn drain_current_thread(&self) -> Result<usize, NativeError>;

    fn destroy(&self, handle: NativeHandle) -> Result<Disposal, NativeError>;

    fn unregister(&self, class: ClassToken) -> Result<(), NativeError>;
}

#[cfg(target_os = "windows")]
pub fn default_backend() -> Arc<dyn IndicatorBackend> {
    Arc::new(windows::Win32Indicator::new())
}

#[cfg(not(target_os = "windows"))]
pub fn default_backend() -> Arc<dyn IndicatorBackend> {
    log::warn!("No native indicator on this platform, using the headless backend");
    Arc::new(headless::HeadlessIndicator::new())
}
