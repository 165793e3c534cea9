pub mod key;
pub mod keymap;

pub use key::{Key, KeyEvent, Modifiers};
pub use keymap::{default_keymap, Action, KeyMap};
