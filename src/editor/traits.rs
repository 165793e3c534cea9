use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::core::Slot;
use crate::widget::{BootError, BootManifest, Surface, Viewport};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("Editor failed to start: {0}")]
    Boot(#[from] BootError),

    #[error("Editor backend already finished starting")]
    AlreadySettled,
}

pub type ChangeHandler = Box<dyn FnMut(Slot)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Ide,
    Lite,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Ide => "ide",
            BackendKind::Lite => "lite",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown editor backend: {0}")]
pub struct UnknownBackend(pub String);

impl FromStr for BackendKind {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ide" => Ok(BackendKind::Ide),
            "lite" => Ok(BackendKind::Lite),
            other => Err(UnknownBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    class: &'static str,
    bounds: Viewport,
}

impl Container {
    pub fn new(class: &'static str) -> Self {
        Self {
            class,
            bounds: Viewport::new(80, 24),
        }
    }

    pub fn class_name(&self) -> &'static str {
        self.class
    }

    pub fn bounds(&self) -> Viewport {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Viewport) {
        self.bounds = bounds;
    }
}

pub trait SaveShortcut {
    fn register_save_shortcut(&mut self, on_save: Box<dyn FnMut()>);
}

// The backend-agnostic editor interface.
// Reads and writes behave the same before and after the backend has
// finished starting; before that they go to an in-memory buffer.
pub trait EditorCore {
    fn kind(&self) -> BackendKind;

    fn value_of(&self, slot: Slot) -> String;

    // Writes `content` into `slot` unless it is already there. Never fires
    // change handlers.
    fn set_value_of(&mut self, slot: Slot, content: &str);

    fn mode(&self) -> Slot;

    fn set_mode(&mut self, slot: Slot);

    fn add_change_handler(&mut self, handler: ChangeHandler);

    fn is_ready(&self) -> bool;

    fn container(&mut self) -> &mut Container;

    fn surface(&self) -> Option<&dyn Surface>;

    fn surface_mut(&mut self) -> Option<&mut dyn Surface>;

    fn resize(&mut self);

    fn boot_manifest(&self) -> BootManifest;

    fn complete_boot(&mut self, result: Result<(), BootError>) -> Result<(), EditorError>;

    fn as_save_shortcut(&mut self) -> Option<&mut dyn SaveShortcut> {
        None
    }

    fn value(&self) -> String {
        self.value_of(self.mode())
    }

    fn set_value(&mut self, content: &str) {
        let mode = self.mode();
        self.set_value_of(mode, content);
    }
}
