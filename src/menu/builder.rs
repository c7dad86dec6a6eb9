use super::router::{EventHandler, EventPattern, EventRoute, EventRouter, HandlerResult};
use super::{ACTIVATE_ID, QUIT_ID, SHOW_ID};
use crate::coordinator::{Command, Coordinator};
use std::sync::Arc;

/// Routes indicator events to coordinator commands.
pub fn build_router(coordinator: &Arc<Coordinator>) -> EventRouter {
    EventRouter::new(vec![
        EventRoute {
            pattern: EventPattern::OneOf(vec![SHOW_ID.to_string(), ACTIVATE_ID.to_string()]),
            handler: command_handler(coordinator, Command::Show, HandlerResult::Continue),
        },
        EventRoute {
            pattern: EventPattern::Exact(QUIT_ID.to_string()),
            handler: command_handler(coordinator, Command::Quit, HandlerResult::Quit),
        },
    ])
}

fn command_handler(coordinator: &Arc<Coordinator>, command: Command, result: HandlerResult) -> EventHandler {
    let coordinator = Arc::clone(coordinator);
    Box::new(move |event_id| {
        log::debug!("Event {} requests {:?}", event_id, command);
        coordinator.request(command);
        Ok(result)
    })
}
