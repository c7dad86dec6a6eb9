use crate::platform::IndicatorBackend;
use crate::ui::{HostWindow, UiQueue, WidgetSet};
use anyhow::Result;
use std::sync::Arc;

pub trait HotkeyService: Send {
    fn unregister_all(&mut self) -> Result<()>;
}

pub struct NoHotkeys;

impl HotkeyService for NoHotkeys {
    fn unregister_all(&mut self) -> Result<()> {
        Ok(())
    }
}

pub trait Terminator: Send + Sync {
    fn terminate(&self, code: i32);
}

pub struct ProcessExit;

impl Terminator for ProcessExit {
    fn terminate(&self, code: i32) {
        log::info!("Exiting with code {}", code);
        std::process::exit(code);
    }
}

pub struct Platform {
    pub indicator: Arc<dyn IndicatorBackend>,
    pub window: Arc<dyn HostWindow>,
    pub widgets: Arc<WidgetSet>,
    pub hotkeys: Box<dyn HotkeyService>,
    pub terminator: Arc<dyn Terminator>,
    pub ui: Arc<UiQueue>,
}

type Callback = Box<dyn Fn() + Send + Sync>;

/// Host hooks. `show` runs while the transition lock is held and must not
/// call back into the coordinator synchronously; `quit` runs on the UI
/// thread as the first cleanup step.
#[derive(Default)]
pub struct Callbacks {
    pub(super) show: Option<Callback>,
    pub(super) quit: Option<Callback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_show(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.show = Some(Box::new(callback));
        self
    }

    pub fn on_quit(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.quit = Some(Box::new(callback));
        self
    }
}
