pub mod console;
pub mod queue;
pub mod widgets;
pub mod window;

pub use queue::UiQueue;
pub use widgets::{DestroyReport, Widget, WidgetSet};
pub use window::{HeadlessWindow, HostWindow};
