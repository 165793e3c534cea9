pub mod controller;
pub mod debounce;
pub mod event;
pub mod preview;
pub mod record;
pub mod router;
pub mod workspace;

pub use controller::{live_document, Request, Settings, SyncController};
pub use debounce::Debouncer;
pub use event::{Effect, Event, SaveTicket};
pub use preview::{PreviewFrame, PreviewReconciler, PreviewSurface, PreviewTarget};
pub use record::{FrameRecord, FrameStore, RecordObserver, RecordPatch};
pub use router::{History, Location, Route, EMPTY_PAD, WELCOME_PAD};
pub use workspace::{KeyOutcome, PaneLayout, Rect, Workspace};
