use anyhow::Result;
use std::sync::Arc;
use tagsnap::config::TraySettings;
use tagsnap::coordinator::{
    Callbacks, Coordinator, HotkeyService, NoHotkeys, Platform, ProcessExit,
};
use tagsnap::hotkeys::{self, HotkeyRegistry};
use tagsnap::ui::console::parse_command;
use tagsnap::ui::{HeadlessWindow, UiQueue, WidgetSet};
use tokio::io::{AsyncBufReadExt, BufReader};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting TagSnap...");

    let settings = TraySettings::load().unwrap_or_else(|e| {
        log::warn!("Failed to load settings, using defaults: {:#}", e);
        TraySettings::default()
    });

    let (hotkeys, show_hotkey) = register_hotkeys(&settings.show_hotkey);

    let ui = Arc::new(UiQueue::new());
    let platform = Platform {
        indicator: tagsnap::platform::default_backend(),
        window: Arc::new(HeadlessWindow::new("TagSnap")),
        widgets: Arc::new(WidgetSet::new()),
        hotkeys,
        terminator: Arc::new(ProcessExit),
        ui: Arc::clone(&ui),
    };
    let callbacks = Callbacks::new()
        .on_show(|| log::info!("Main window shown"))
        .on_quit(|| log::info!("Shutting down"));
    let coordinator = Coordinator::new(platform, callbacks, settings.coordinator_settings());

    if let Some(id) = show_hotkey {
        hotkeys::spawn_listener(id, Arc::clone(&coordinator));
    }

    #[cfg(target_os = "windows")]
    tagsnap::menu::spawn_event_pump(
        tagsnap::menu::build_router(&coordinator),
        coordinator.exiting_flag(),
    );

    let runtime = tokio::runtime::Runtime::new()?;
    let interrupted = Arc::clone(&coordinator);
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupt received");
            interrupted.quit();
        }
    });

    // The headless window has no close button of its own; console lines
    // stand in for the host toolkit's window events.
    let console = Arc::clone(&coordinator);
    runtime.spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match parse_command(&line) {
                Some(command) => console.request(command),
                None if line.trim().is_empty() => {}
                None => log::warn!("Unknown command: {}", line.trim()),
            }
        }
    });

    if settings.start_hidden {
        coordinator.hide();
    }

    log::info!("TagSnap started successfully");

    coordinator.run_until_exit();

    log::info!("UI loop finished");
    Ok(())
}

fn register_hotkeys(binding: &str) -> (Box<dyn HotkeyService>, Option<u32>) {
    let mut registry = match HotkeyRegistry::new() {
        Ok(registry) => registry,
        Err(e) => {
            log::warn!("Global hotkeys unavailable: {}", e);
            return (Box::new(NoHotkeys), None);
        }
    };

    match registry.register(binding) {
        Ok(id) => (Box::new(registry), Some(id)),
        Err(e) => {
            log::warn!("Failed to register show hotkey: {:#}", e);
            (Box::new(registry), None)
        }
    }
}
