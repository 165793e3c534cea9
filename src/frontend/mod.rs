pub mod runtime;
pub mod terminal;
pub mod traits;

pub use runtime::Runtime;
pub use terminal::TerminalFrontend;
pub use traits::{Frontend, FrontendError, FrontendEvent};
