use crate::core::{Identity, Slot};
use crate::services::StoreError;
use crate::widget::{BootError, BootManifest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SaveTicket(pub u64);

// Work the workspace wants done off the UI thread. Each effect is answered
// by exactly one `Event`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Boot(BootManifest),
    Fetch {
        slot: Slot,
        identity: Identity,
    },
    Store {
        ticket: SaveTicket,
        slot: Slot,
        content: String,
    },
}

#[derive(Debug)]
pub enum Event {
    BackendBooted(Result<(), BootError>),
    FetchCompleted {
        slot: Slot,
        identity: Identity,
        result: Result<String, StoreError>,
    },
    StoreCompleted {
        ticket: SaveTicket,
        slot: Slot,
        result: Result<Identity, StoreError>,
    },
}
