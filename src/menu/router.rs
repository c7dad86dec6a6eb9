use anyhow::Result;

pub struct EventRoute {
    pub pattern: EventPattern,
    pub handler: EventHandler,
}

pub enum EventPattern {
    Exact(String),
    OneOf(Vec<String>),
}

impl EventPattern {
    pub fn matches(&self, event_id: &str) -> bool {
        match self {
            EventPattern::Exact(s) => s == event_id,
            EventPattern::OneOf(ids) => ids.iter().any(|id| id == event_id),
        }
    }
}

pub type EventHandler = Box<dyn Fn(&str) -> Result<HandlerResult> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerResult {
    Continue,
    Quit,
}

pub struct EventRouter {
    routes: Vec<EventRoute>,
}

impl EventRouter {
    pub fn new(routes: Vec<EventRoute>) -> Self {
        Self { routes }
    }

    pub fn route(&self, event_id: &str) -> Result<HandlerResult> {
        match self.routes.iter().find(|route| route.pattern.matches(event_id)) {
            Some(route) => (route.handler)(event_id),
            None => {
                log::warn!("No route found for event: {}", event_id);
                Ok(HandlerResult::Continue)
            }
        }
    }
}
