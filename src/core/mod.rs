pub mod identity;
pub mod position;
pub mod rope_ext;
pub mod slot;
pub mod undo;

pub use identity::{Identity, InvalidIdentity};
pub use position::{ByteOffset, CharOffset, Position};
pub use rope_ext::RopeExt;
pub use slot::{Slot, SlotPair, UnknownSlot};
pub use undo::{Edit, UndoHistory, UndoStep};
