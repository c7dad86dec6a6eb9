use global_hotkey::hotkey::Code;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Named keys accepted in hotkey strings, lower-case.
pub static KEY_CODE_MAP: Lazy<HashMap<&'static str, Code>> = Lazy::new(|| {
    let letters = [
        Code::KeyA, Code::KeyB, Code::KeyC, Code::KeyD, Code::KeyE, Code::KeyF, Code::KeyG,
        Code::KeyH, Code::KeyI, Code::KeyJ, Code::KeyK, Code::KeyL, Code::KeyM, Code::KeyN,
        Code::KeyO, Code::KeyP, Code::KeyQ, Code::KeyR, Code::KeyS, Code::KeyT, Code::KeyU,
        Code::KeyV, Code::KeyW, Code::KeyX, Code::KeyY, Code::KeyZ,
    ];
    let digits = [
        Code::Digit0, Code::Digit1, Code::Digit2, Code::Digit3, Code::Digit4,
        Code::Digit5, Code::Digit6, Code::Digit7, Code::Digit8, Code::Digit9,
    ];
    let function_keys = [
        Code::F1, Code::F2, Code::F3, Code::F4, Code::F5, Code::F6,
        Code::F7, Code::F8, Code::F9, Code::F10, Code::F11, Code::F12,
    ];

    const LETTER_NAMES: [&str; 26] = [
        "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m",
        "n", "o", "p", "q", "r", "s", "t", "u", "v", "w", "x", "y", "z",
    ];
    const DIGIT_NAMES: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];
    const FUNCTION_NAMES: [&str; 12] = [
        "f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9", "f10", "f11", "f12",
    ];

    let mut map: HashMap<&'static str, Code> = LETTER_NAMES
        .into_iter()
        .zip(letters)
        .chain(DIGIT_NAMES.into_iter().zip(digits))
        .chain(FUNCTION_NAMES.into_iter().zip(function_keys))
        .collect();

    map.extend([
        ("space", Code::Space),
        ("enter", Code::Enter),
        ("return", Code::Enter),
        ("escape", Code::Escape),
        ("esc", Code::Escape),
        ("tab", Code::Tab),
        ("backspace", Code::Backspace),
        ("delete", Code::Delete),
        ("del", Code::Delete),
        ("insert", Code::Insert),
        ("home", Code::Home),
        ("end", Code::End),
        ("pageup", Code::PageUp),
        ("pagedown", Code::PageDown),
        ("up", Code::ArrowUp),
        ("down", Code::ArrowDown),
        ("left", Code::ArrowLeft),
        ("right", Code::ArrowRight),
        ("printscreen", Code::PrintScreen),
        ("prtsc", Code::PrintScreen),
        ("pause", Code::Pause),
    ]);
    map
});
