mod types;

use crate::coordinator::{Command, Coordinator, HotkeyService};
use anyhow::{anyhow, Context, Result};
use global_hotkey::{
    hotkey::{Code, HotKey, Modifiers},
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use types::KEY_CODE_MAP;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct HotkeyRegistry {
    manager: GlobalHotKeyManager,
    registered: Vec<HotKey>,
}

impl HotkeyRegistry {
    pub fn new() -> Result<Self> {
        Ok(Self {
            manager: GlobalHotKeyManager::new()?,
            registered: Vec::new(),
        })
    }

    pub fn register(&mut self, binding: &str) -> Result<u32> {
        let hotkey = parse_hotkey(binding).ok_or_else(|| anyhow!("Invalid hotkey string: {}", binding))?;
        self.manager
            .register(hotkey)
            .with_context(|| format!("Failed to register hotkey {}", binding))?;
        self.registered.push(hotkey);
        log::info!("Registered hotkey: {}", binding);
        Ok(hotkey.id())
    }
}

impl HotkeyService for HotkeyRegistry {
    fn unregister_all(&mut self) -> Result<()> {
        if self.registered.is_empty() {
            return Ok(());
        }
        let result = self.manager.unregister_all(&self.registered);
        self.registered.clear();
        result?;
        log::info!("Unregistered global hotkeys");
        Ok(())
    }
}

pub fn parse_hotkey(s: &str) -> Option<HotKey> {
    let mut modifiers = Modifiers::empty();
    let mut key_code = None;

    for part in s.split('+').map(str::trim) {
        match part.to_lowercase().as_str() {
            "" => return None,
            "ctrl" | "control" => modifiers |= Modifiers::CONTROL,
            "alt" => modifiers |= Modifiers::ALT,
            "shift" => modifiers |= Modifiers::SHIFT,
            "super" | "win" | "meta" | "cmd" => modifiers |= Modifiers::SUPER,
            key => key_code = Some(parse_key_code(key)?),
        }
    }

    Some(HotKey::new(Some(modifiers), key_code?))
}

fn parse_key_code(s: &str) -> Option<Code> {
    KEY_CODE_MAP.get(s.to_lowercase().as_str()).copied()
}

/// Forwards presses of the show hotkey to the coordinator until it starts
/// exiting.
pub fn spawn_listener(show_id: u32, coordinator: Arc<Coordinator>) -> JoinHandle<()> {
    let receiver = GlobalHotKeyEvent::receiver();

    thread::spawn(move || {
        while !coordinator.is_exiting() {
            let Ok(event) = receiver.try_recv() else {
                thread::sleep(POLL_INTERVAL);
                continue;
            };
            if event.id() == show_id && event.state() == HotKeyState::Pressed {
                log::info!("Show hotkey pressed");
                coordinator.request(Command::Show);
            }
        }
        log::debug!("Hotkey listener stopped");
    })
}
