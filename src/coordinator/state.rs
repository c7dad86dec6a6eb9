#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinatorState {
    #[default]
    WindowVisible,
    TrayActive,
    Exiting,
}

impl CoordinatorState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CoordinatorState::Exiting)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Show,
    Hide,
    Quit,
}
