use std::sync::{Arc, Mutex};
use tagsnap::coordinator::{
    Callbacks, Coordinator, CoordinatorSettings, CoordinatorState, NoHotkeys, Platform, Terminator,
};
use tagsnap::menu::router::{EventPattern, EventRoute, EventRouter, HandlerResult};
use tagsnap::menu::{build_router, dispatch, ACTIVATE_ID, QUIT_ID, SHOW_ID};
use tagsnap::platform::headless::HeadlessIndicator;
use tagsnap::ui::{HeadlessWindow, UiQueue, WidgetSet};

#[derive(Default)]
struct RecordingExit(Mutex<Vec<i32>>);

impl Terminator for RecordingExit {
    fn terminate(&self, code: i32) {
        self.0.lock().unwrap().push(code);
    }
}

fn recording_route(pattern: EventPattern, log: &Arc<Mutex<Vec<String>>>, result: HandlerResult) -> EventRoute {
    let log = log.clone();
    EventRoute {
        pattern,
        handler: Box::new(move |event_id| {
            log.lock().unwrap().push(event_id.to_string());
            Ok(result)
        }),
    }
}

fn coordinator_with(ui: &Arc<UiQueue>, exit: &Arc<RecordingExit>) -> Arc<Coordinator> {
    let platform = Platform {
        indicator: Arc::new(HeadlessIndicator::new()),
        window: Arc::new(HeadlessWindow::new("menu test")),
        widgets: Arc::new(WidgetSet::new()),
        hotkeys: Box::new(NoHotkeys),
        terminator: exit.clone(),
        ui: ui.clone(),
    };
    Coordinator::new(platform, Callbacks::new(), CoordinatorSettings::default())
}

#[test]
fn exact_pattern_matches_only_exact_string() {
    let pattern = EventPattern::Exact("quit".to_string());
    let cases = [("quit", true), ("quit_now", false), ("qui", false), ("show", false)];

    for (event_id, expected) in cases {
        assert_eq!(pattern.matches(event_id), expected, "event {:?}", event_id);
    }
}

#[test]
fn one_of_pattern_matches_any_listed_id() {
    let pattern = EventPattern::OneOf(vec!["show".to_string(), "activate".to_string()]);
    let cases = [("show", true), ("activate", true), ("activated", false), ("", false)];

    for (event_id, expected) in cases {
        assert_eq!(pattern.matches(event_id), expected, "event {:?}", event_id);
    }
}

#[test]
fn router_uses_first_matching_route_and_passes_event_id() {
    // Arrange
    let first = Arc::new(Mutex::new(Vec::new()));
    let second = Arc::new(Mutex::new(Vec::new()));
    let router = EventRouter::new(vec![
        recording_route(EventPattern::OneOf(vec!["a".into(), "b".into()]), &first, HandlerResult::Continue),
        recording_route(EventPattern::Exact("b".into()), &second, HandlerResult::Quit),
    ]);

    // Act
    let result = router.route("b").unwrap();

    // Assert
    assert_eq!(result, HandlerResult::Continue);
    assert_eq!(*first.lock().unwrap(), vec!["b".to_string()]);
    assert!(second.lock().unwrap().is_empty());
}

#[test]
fn router_continues_on_unmatched_events() {
    // Arrange
    let log = Arc::new(Mutex::new(Vec::new()));
    let router = EventRouter::new(vec![recording_route(
        EventPattern::Exact("quit".into()),
        &log,
        HandlerResult::Quit,
    )]);

    // Act
    let result = router.route("unknown").unwrap();

    // Assert
    assert_eq!(result, HandlerResult::Continue);
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn dispatch_stops_only_on_quit_result() {
    // Arrange
    let router = EventRouter::new(vec![
        EventRoute {
            pattern: EventPattern::Exact("quit".into()),
            handler: Box::new(|_| Ok(HandlerResult::Quit)),
        },
        EventRoute {
            pattern: EventPattern::Exact("broken".into()),
            handler: Box::new(|_| Err(anyhow::anyhow!("handler failed"))),
        },
    ]);

    // Act / Assert
    assert!(dispatch(&router, "quit"));
    assert!(!dispatch(&router, "broken"));
    assert!(!dispatch(&router, "unknown"));
}

#[test]
fn show_and_activate_restore_window_through_coordinator() {
    for event_id in [SHOW_ID, ACTIVATE_ID] {
        // Arrange
        let ui = Arc::new(UiQueue::new());
        let exit = Arc::new(RecordingExit::default());
        let coordinator = coordinator_with(&ui, &exit);
        let router = build_router(&coordinator);
        coordinator.hide();

        // Act
        let stop = dispatch(&router, event_id);

        // Assert
        assert!(!stop, "event {:?}", event_id);
        assert_eq!(coordinator.state(), CoordinatorState::WindowVisible, "event {:?}", event_id);
        assert!(!coordinator.worker_alive());
    }
}

#[test]
fn quit_menu_item_exits_application() {
    // Arrange
    let ui = Arc::new(UiQueue::new());
    let exit = Arc::new(RecordingExit::default());
    let coordinator = coordinator_with(&ui, &exit);
    let router = build_router(&coordinator);
    coordinator.hide();

    // Act
    let stop = dispatch(&router, QUIT_ID);

    // Assert
    assert!(stop);
    assert_eq!(coordinator.state(), CoordinatorState::Exiting);
    assert_eq!(*exit.0.lock().unwrap(), vec![0]);
}
