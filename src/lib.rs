pub mod config;
pub mod coordinator;
pub mod error;
pub mod hotkeys;
pub mod menu;
pub mod paths;
pub mod platform;
pub mod tray;
pub mod ui;
