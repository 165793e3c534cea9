use bitflags::bitflags;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    F(u8),
    Backspace,
    Tab,
    Enter,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
    Unknown,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const CTRL  = 0b0001;
        const META  = 0b0010;
        const SHIFT = 0b0100;
        const SUPER = 0b1000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn char(c: char) -> Self {
        Self::new(Key::Char(c), Modifiers::NONE)
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(Key::Char(c.to_ascii_lowercase()), Modifiers::CTRL)
    }

    pub fn function(n: u8) -> Self {
        Self::new(Key::F(n), Modifiers::NONE)
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(Modifiers::CTRL) {
            write!(f, "C-")?;
        }
        if self.modifiers.contains(Modifiers::META) {
            write!(f, "M-")?;
        }
        if self.modifiers.contains(Modifiers::SUPER) {
            write!(f, "s-")?;
        }
        if self.modifiers.contains(Modifiers::SHIFT) {
            write!(f, "S-")?;
        }

        match self.key {
            Key::Char(c) => write!(f, "{}", c),
            Key::F(n) => write!(f, "F{}", n),
            Key::Backspace => write!(f, "Backspace"),
            Key::Tab => write!(f, "Tab"),
            Key::Enter => write!(f, "Enter"),
            Key::Escape => write!(f, "Esc"),
            Key::Up => write!(f, "Up"),
            Key::Down => write!(f, "Down"),
            Key::Left => write!(f, "Left"),
            Key::Right => write!(f, "Right"),
            Key::Home => write!(f, "Home"),
            Key::End => write!(f, "End"),
            Key::PageUp => write!(f, "PageUp"),
            Key::PageDown => write!(f, "PageDown"),
            Key::Delete => write!(f, "Delete"),
            Key::Unknown => write!(f, "?"),
        }
    }
}

impl From<crossterm::event::KeyEvent> for KeyEvent {
    fn from(event: crossterm::event::KeyEvent) -> Self {
        use crossterm::event::{KeyCode, KeyModifiers};

        let mut modifiers = Modifiers::NONE;
        if event.modifiers.contains(KeyModifiers::CONTROL) {
            modifiers |= Modifiers::CTRL;
        }
        if event.modifiers.contains(KeyModifiers::ALT) {
            modifiers |= Modifiers::META;
        }
        if event.modifiers.contains(KeyModifiers::SHIFT) {
            modifiers |= Modifiers::SHIFT;
        }
        if event.modifiers.contains(KeyModifiers::SUPER) {
            modifiers |= Modifiers::SUPER;
        }

        let key = match event.code {
            // Terminals report Ctrl-S as 'S' with some layouts; fold it back.
            KeyCode::Char(c) if modifiers.intersects(Modifiers::CTRL | Modifiers::META) => {
                if c.is_ascii_uppercase() {
                    modifiers |= Modifiers::SHIFT;
                }
                Key::Char(c.to_ascii_lowercase())
            }
            // Typed text carries its own case; SHIFT is implied by the char.
            KeyCode::Char(c) => {
                modifiers.remove(Modifiers::SHIFT);
                Key::Char(c)
            }
            KeyCode::F(n) => Key::F(n),
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Tab => Key::Tab,
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::Delete => Key::Delete,
            _ => Key::Unknown,
        };

        Self { key, modifiers }
    }
}
