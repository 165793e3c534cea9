use std::collections::HashMap;

use crate::core::Slot;

use super::key::{Key, KeyEvent, Modifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SwitchMode(Slot),
    Save,
    RefreshPreview,
    ToggleSettings,
    ToggleAsYouType,
    ShiftSplit(i8),
    Quit,
}

#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    bindings: HashMap<KeyEvent, Action>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, key: KeyEvent, action: Action) {
        self.bindings.insert(key, action);
    }

    pub fn get(&self, key: &KeyEvent) -> Option<Action> {
        self.bindings.get(key).copied()
    }

    pub fn unbind(&mut self, key: &KeyEvent) {
        self.bindings.remove(key);
    }

    pub fn key_for(&self, action: Action) -> Option<KeyEvent> {
        let mut keys: Vec<KeyEvent> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(k, _)| *k)
            .collect();
        keys.sort_by_key(|k| k.to_string());
        keys.into_iter().next()
    }
}

pub fn default_keymap() -> KeyMap {
    let mut map = KeyMap::new();
    map.bind(KeyEvent::function(2), Action::SwitchMode(Slot::Markup));
    map.bind(KeyEvent::function(3), Action::SwitchMode(Slot::Script));
    map.bind(KeyEvent::function(5), Action::Save);
    map.bind(KeyEvent::function(6), Action::RefreshPreview);
    map.bind(KeyEvent::function(7), Action::ToggleSettings);
    map.bind(KeyEvent::function(8), Action::ToggleAsYouType);
    map.bind(KeyEvent::new(Key::Left, Modifiers::META), Action::ShiftSplit(-5));
    map.bind(KeyEvent::new(Key::Right, Modifiers::META), Action::ShiftSplit(5));
    map.bind(KeyEvent::ctrl('q'), Action::Quit);
    map.bind(KeyEvent::new(Key::Escape, Modifiers::NONE), Action::Quit);
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let map = default_keymap();
        assert_eq!(map.get(&KeyEvent::function(5)), Some(Action::Save));
        assert_eq!(
            map.get(&KeyEvent::function(3)),
            Some(Action::SwitchMode(Slot::Script))
        );
        assert_eq!(map.get(&KeyEvent::char('a')), None);
        assert_eq!(map.get(&KeyEvent::ctrl('s')), None);
        assert_eq!(
            map.get(&KeyEvent::new(Key::Right, Modifiers::META)),
            Some(Action::ShiftSplit(5))
        );
    }

    #[test]
    fn test_key_for_action() {
        let mut map = default_keymap();
        assert_eq!(map.key_for(Action::Save), Some(KeyEvent::function(5)));
        map.unbind(&KeyEvent::function(5));
        assert_eq!(map.key_for(Action::Save), None);
    }
}
