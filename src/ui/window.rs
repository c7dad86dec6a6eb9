use anyhow::{bail, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub trait HostWindow: Send + Sync {
    fn withdraw(&self) -> Result<()>;
    fn restore(&self) -> Result<()>;
    fn is_viewable(&self) -> bool;
    fn focus(&self) -> Result<()>;
    fn raise(&self) -> Result<()>;
    fn set_topmost(&self, topmost: bool) -> Result<()>;
    fn destroy(&self) -> Result<()>;
}

/// Window stand-in used when no GUI toolkit is attached.
pub struct HeadlessWindow {
    title: String,
    visible: AtomicBool,
    topmost: AtomicBool,
    destroyed: AtomicBool,
    withdraws: AtomicUsize,
    restores: AtomicUsize,
    focus_requests: AtomicUsize,
}

impl HeadlessWindow {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            visible: AtomicBool::new(true),
            topmost: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
            withdraws: AtomicUsize::new(0),
            restores: AtomicUsize::new(0),
            focus_requests: AtomicUsize::new(0),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_topmost(&self) -> bool {
        self.topmost.load(Ordering::SeqCst)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    pub fn withdraw_count(&self) -> usize {
        self.withdraws.load(Ordering::SeqCst)
    }

    pub fn restore_count(&self) -> usize {
        self.restores.load(Ordering::SeqCst)
    }

    pub fn focus_count(&self) -> usize {
        self.focus_requests.load(Ordering::SeqCst)
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.is_destroyed() {
            bail!("window '{}' has been destroyed", self.title);
        }
        Ok(())
    }
}

impl HostWindow for HeadlessWindow {
    fn withdraw(&self) -> Result<()> {
        self.ensure_alive()?;
        self.visible.store(false, Ordering::SeqCst);
        self.withdraws.fetch_add(1, Ordering::SeqCst);
        log::debug!("Window '{}' withdrawn", self.title);
        Ok(())
    }

    fn restore(&self) -> Result<()> {
        self.ensure_alive()?;
        self.visible.store(true, Ordering::SeqCst);
        self.restores.fetch_add(1, Ordering::SeqCst);
        log::debug!("Window '{}' restored", self.title);
        Ok(())
    }

    fn is_viewable(&self) -> bool {
        !self.is_destroyed() && self.visible.load(Ordering::SeqCst)
    }

    fn focus(&self) -> Result<()> {
        self.ensure_alive()?;
        self.focus_requests.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn raise(&self) -> Result<()> {
        self.ensure_alive()
    }

    fn set_topmost(&self, topmost: bool) -> Result<()> {
        self.ensure_alive()?;
        self.topmost.store(topmost, Ordering::SeqCst);
        Ok(())
    }

    fn destroy(&self) -> Result<()> {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            bail!("window '{}' already destroyed", self.title);
        }
        self.visible.store(false, Ordering::SeqCst);
        log::debug!("Window '{}' destroyed", self.title);
        Ok(())
    }
}
