pub mod config;
pub mod core;
pub mod editor;
pub mod frontend;
pub mod keybinding;
pub mod services;
pub mod state;
pub mod widget;

pub use config::{Cli, Config};
pub use state::Workspace;
