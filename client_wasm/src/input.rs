//! Keyboard mapping
//!
//! Browser key names are normalised before they reach the session so the
//! recorded log only ever holds the canonical names.

use game_core::HoldButton;

/// Canonical key name, or `None` if the key does nothing in the cabinet
pub fn normalize_key(key: &str) -> Option<&'static str> {
    match key {
        "w" | "W" => Some("w"),
        "a" | "A" => Some("a"),
        "s" | "S" => Some("s"),
        "d" | "D" => Some("d"),
        "ArrowUp" => Some("ArrowUp"),
        "ArrowDown" => Some("ArrowDown"),
        "ArrowLeft" => Some("ArrowLeft"),
        "ArrowRight" => Some("ArrowRight"),
        " " | "Spacebar" => Some(" "),
        _ => None,
    }
}

/// Keys the page should stop from scrolling
pub fn prevents_default(key: &str) -> bool {
    matches!(key, " " | "Spacebar" | "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight")
}

/// Touch button id from the page
pub fn hold_button(id: &str) -> Option<HoldButton> {
    match id {
        "up" => Some(HoldButton::Up),
        "left" => Some(HoldButton::Left),
        "right" => Some(HoldButton::Right),
        "grab" => Some(HoldButton::Grab),
        _ => None,
    }
}
