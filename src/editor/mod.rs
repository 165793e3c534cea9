pub mod ide;
pub mod lite;
pub mod select;
pub mod stage;
pub mod traits;

pub use ide::IdeEditor;
pub use lite::LiteEditor;
pub use select::{create_core, select_backend, DeviceClass};
pub use stage::Stage;
pub use traits::{
    BackendKind, ChangeHandler, Container, EditorCore, EditorError, SaveShortcut, UnknownBackend,
};
