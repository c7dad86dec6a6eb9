use thiserror::Error;

pub const ERROR_INVALID_WINDOW_HANDLE: u32 = 1400;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NativeError {
    #[error("native resource is already invalid")]
    InvalidHandle,
    #[error("{op} failed with OS error {code}")]
    Os { op: &'static str, code: u32 },
    #[error("indicator loop is already running for this handle")]
    LoopAlreadyRunning,
    #[error("indicator unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Benign,
    Unexpected,
}

pub fn classify(error: &NativeError) -> Severity {
    match error {
        NativeError::InvalidHandle => Severity::Benign,
        NativeError::Os { code, .. } if *code == ERROR_INVALID_WINDOW_HANDLE => Severity::Benign,
        _ => Severity::Unexpected,
    }
}

pub fn report(error: &NativeError, context: &str) -> Severity {
    let severity = classify(error);
    match severity {
        Severity::Benign => log::debug!("{}: {} (ignored)", context, error),
        Severity::Unexpected => log::warn!("{}: {}", context, error),
    }
    severity
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    #[error("widget is already gone")]
    AlreadyGone,
    #[error("widget teardown failed: {0}")]
    Failed(String),
}
