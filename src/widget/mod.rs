//! Native editor widgets.
//!
//! These play the part of the third-party editing libraries: they own text,
//! cursors, undo history and key handling. The `editor` module adapts each of
//! them to the backend-agnostic `EditorCore` interface.

pub mod boot;
pub mod lite;
pub mod model;

use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::Position;
use crate::keybinding::KeyEvent;

pub use boot::{run_manifest, AssetLoader, BootError, BootManifest, BundledAssets};
pub use lite::{Change, Doc, LiteView, Origin};
pub use model::{ContentChange, IdeView, SharedModel, TextModel};

static DOCUMENT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub u64);

impl DocumentId {
    pub fn new() -> Self {
        Self(DOCUMENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Html,
    JavaScript,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

pub trait Surface {
    fn handle_key(&mut self, key: KeyEvent) -> bool;

    fn visible_lines(&self) -> Vec<String>;

    fn cursor_position(&self) -> Position;

    fn scroll_line(&self) -> usize;

    fn viewport(&self) -> Viewport;
}

pub(crate) fn scroll_to_show(scroll_line: usize, cursor_line: usize, height: u16) -> usize {
    let height = usize::from(height.max(1));
    if cursor_line < scroll_line {
        cursor_line
    } else if cursor_line >= scroll_line + height {
        cursor_line + 1 - height
    } else {
        scroll_line
    }
}
