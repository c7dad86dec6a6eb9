use crate::coordinator::Command;

/// Maps a line typed into the console stand-in to a coordinator command.
pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_lowercase().as_str() {
        "hide" | "close" => Some(Command::Hide),
        "show" => Some(Command::Show),
        "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}
