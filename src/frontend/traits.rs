use thiserror::Error;

use crate::keybinding::KeyEvent;
use crate::state::Workspace;

use super::runtime::Runtime;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait Frontend {
    fn init(&mut self) -> Result<(), FrontendError>;

    fn shutdown(&mut self) -> Result<(), FrontendError>;

    fn size(&self) -> (u16, u16);

    fn run(self, workspace: Workspace, runtime: Runtime) -> Result<(), FrontendError>;

    fn render(&mut self, workspace: &Workspace) -> Result<(), FrontendError>;

    fn bell(&mut self);

    fn set_title(&mut self, _title: &str) {}
}

#[derive(Debug, Clone)]
pub enum FrontendEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    Mouse(MouseEvent),
    Focus(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub column: u16,
    pub row: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Down,
    Up,
    Drag,
}
