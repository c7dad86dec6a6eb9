pub mod builder;
pub mod router;

pub use builder::build_router;

use router::{EventRouter, HandlerResult};

pub const SHOW_ID: &str = "show";
pub const QUIT_ID: &str = "quit";
/// Synthetic id for a left click on the indicator itself.
pub const ACTIVATE_ID: &str = "activate";

/// Routes one event. Returns true once the event loop should stop.
pub fn dispatch(router: &EventRouter, event_id: &str) -> bool {
    log::debug!("Menu event: {}", event_id);

    match router.route(event_id) {
        Ok(HandlerResult::Quit) => {
            log::info!("Quit selected from indicator menu");
            true
        }
        Ok(HandlerResult::Continue) => false,
        Err(e) => {
            log::error!("Error handling menu event: {}", e);
            false
        }
    }
}

#[cfg(target_os = "windows")]
pub fn spawn_event_pump(
    router: EventRouter,
    exiting: std::sync::Arc<std::sync::atomic::AtomicBool>,
) -> std::thread::JoinHandle<()> {
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tray_icon::menu::MenuEvent;
    use tray_icon::{MouseButton, MouseButtonState, TrayIconEvent};

    let menu_receiver = MenuEvent::receiver();
    let tray_receiver = TrayIconEvent::receiver();

    std::thread::spawn(move || {
        while !exiting.load(Ordering::SeqCst) {
            let mut idle = true;

            while let Ok(event) = menu_receiver.try_recv() {
                idle = false;
                if dispatch(&router, &event.id.0) {
                    return;
                }
            }

            while let Ok(event) = tray_receiver.try_recv() {
                idle = false;
                if let TrayIconEvent::Click {
                    button: MouseButton::Left,
                    button_state: MouseButtonState::Up,
                    ..
                } = event
                {
                    dispatch(&router, ACTIVATE_ID);
                }
            }

            if idle {
                std::thread::sleep(Duration::from_millis(50));
            }
        }
    })
}
