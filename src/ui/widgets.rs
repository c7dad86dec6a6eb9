use crate::error::WidgetError;
use std::sync::{Arc, Mutex, MutexGuard};

pub trait Widget: Send + Sync {
    fn name(&self) -> &str;
    fn exists(&self) -> bool;
    fn destroy(&self) -> Result<(), WidgetError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DestroyReport {
    pub destroyed: usize,
    pub absent: usize,
    pub failed: usize,
}

#[derive(Default)]
pub struct WidgetSet {
    widgets: Mutex<Vec<Arc<dyn Widget>>>,
}

impl WidgetSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<dyn Widget>>> {
        self.widgets.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn track(&self, widget: Arc<dyn Widget>) {
        self.lock().push(widget);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn all_gone(&self) -> bool {
        self.lock().iter().all(|w| !w.exists())
    }

    pub fn destroy_all(&self) -> DestroyReport {
        let widgets: Vec<_> = self.lock().clone();
        let mut report = DestroyReport::default();

        for widget in widgets {
            if !widget.exists() {
                report.absent += 1;
                continue;
            }
            match widget.destroy() {
                Ok(()) => report.destroyed += 1,
                Err(WidgetError::AlreadyGone) => {
                    log::debug!("Widget '{}' was already gone", widget.name());
                    report.absent += 1;
                }
                Err(e) => {
                    log::warn!("Failed to destroy widget '{}': {}", widget.name(), e);
                    report.failed += 1;
                }
            }
        }
        report
    }
}
