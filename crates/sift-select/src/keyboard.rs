//! Keyboard input for the widget.
//!
//! Hosts translate their platform key events into [`KeyEvent`]s and feed them
//! to [`SearchSelect::handle_key`](crate::SearchSelect::handle_key). Web-style
//! key names (`"ArrowDown"`, `" "`, `"Escape"`, ...) convert through
//! [`Key::from_name`].

/// Keyboard modifiers that may be held during input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyboardModifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held (Cmd on macOS).
    pub control: bool,
    /// The Alt key is held (Option on macOS).
    pub alt: bool,
    /// The Meta/Super key is held.
    pub meta: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Shift modifier only.
    pub const SHIFT: Self = Self {
        shift: true,
        control: false,
        alt: false,
        meta: false,
    };

    /// Whether any modifier is held.
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.meta
    }
}

/// The keys the widget reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Space,
    Escape,
    Tab,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    /// A printable character other than space.
    Character(char),
    /// Any other key.
    Other,
}

impl Key {
    /// Convert a web-style key name into a [`Key`].
    ///
    /// ```
    /// use sift_select::Key;
    ///
    /// assert_eq!(Key::from_name("ArrowDown"), Key::ArrowDown);
    /// assert_eq!(Key::from_name(" "), Key::Space);
    /// assert_eq!(Key::from_name("b"), Key::Character('b'));
    /// assert_eq!(Key::from_name("F5"), Key::Other);
    /// ```
    pub fn from_name(name: &str) -> Self {
        match name {
            "Enter" => Self::Enter,
            " " | "Space" | "Spacebar" => Self::Space,
            "Escape" | "Esc" => Self::Escape,
            "Tab" => Self::Tab,
            "ArrowUp" | "Up" => Self::ArrowUp,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "Home" => Self::Home,
            "End" => Self::End,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) if !ch.is_control() => Self::Character(ch),
                    _ => Self::Other,
                }
            }
        }
    }

    /// Whether pressing this key on the closed display opens the dropdown.
    pub fn opens_dropdown(self) -> bool {
        matches!(self, Self::Enter | Self::Space | Self::ArrowUp | Self::ArrowDown)
    }
}

/// A key press delivered to the widget.
///
/// The widget reads only `key`; `modifiers` is carried for hosts that route
/// events before they reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key that was pressed.
    pub key: Key,
    /// Keyboard modifiers held during the event.
    pub modifiers: KeyboardModifiers,
}

impl KeyEvent {
    /// Create a key event without modifiers.
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: KeyboardModifiers::NONE,
        }
    }

    /// Create a key event with modifiers.
    pub fn with_modifiers(key: Key, modifiers: KeyboardModifiers) -> Self {
        Self { key, modifiers }
    }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self {
        Self::new(key)
    }
}

/// What the widget did with a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    /// The widget acted on the key.
    pub handled: bool,
    /// The host should suppress the platform's default action for the key.
    pub prevent_default: bool,
}

impl KeyOutcome {
    /// The key was not for the widget.
    pub const IGNORED: Self = Self {
        handled: false,
        prevent_default: false,
    };

    /// The widget consumed the key.
    pub const CONSUMED: Self = Self {
        handled: true,
        prevent_default: true,
    };

    /// The widget acted but the default action (e.g. focus traversal) should proceed.
    pub const PASS_THROUGH: Self = Self {
        handled: true,
        prevent_default: false,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_named_keys() {
        assert_eq!(Key::from_name("Enter"), Key::Enter);
        assert_eq!(Key::from_name("Escape"), Key::Escape);
        assert_eq!(Key::from_name("Esc"), Key::Escape);
        assert_eq!(Key::from_name("Tab"), Key::Tab);
        assert_eq!(Key::from_name("ArrowUp"), Key::ArrowUp);
        assert_eq!(Key::from_name("Home"), Key::Home);
        assert_eq!(Key::from_name("End"), Key::End);
    }

    #[test]
    fn test_from_name_characters() {
        assert_eq!(Key::from_name("é"), Key::Character('é'));
        assert_eq!(Key::from_name("\u{7}"), Key::Other);
        assert_eq!(Key::from_name("Shift"), Key::Other);
        assert_eq!(Key::from_name(""), Key::Other);
    }

    #[test]
    fn test_opens_dropdown() {
        assert!(Key::Enter.opens_dropdown());
        assert!(Key::Space.opens_dropdown());
        assert!(Key::ArrowDown.opens_dropdown());
        assert!(!Key::Escape.opens_dropdown());
        assert!(!Key::Home.opens_dropdown());
    }

    #[test]
    fn test_modifiers() {
        assert!(!KeyboardModifiers::NONE.any());
        assert!(KeyboardModifiers::SHIFT.any());
        let event = KeyEvent::with_modifiers(Key::Tab, KeyboardModifiers::SHIFT);
        assert!(event.modifiers.shift);
        assert_eq!(KeyEvent::from(Key::Tab).modifiers, KeyboardModifiers::NONE);
    }
}
