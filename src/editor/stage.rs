use crate::core::{Slot, SlotPair};
use crate::widget::BootError;

use super::traits::EditorError;

// Lifecycle of a backend's documents.
// Starts as plain buffered strings. On a successful boot the strings are
// moved into the backend's native structures exactly once; a failed boot
// keeps the buffer for good.
#[derive(Debug)]
pub enum Stage<R> {
    Loading(SlotPair<String>),
    Ready(R),
    Failed {
        frames: SlotPair<String>,
        error: BootError,
    },
}

impl<R> Default for Stage<R> {
    fn default() -> Self {
        Stage::Loading(SlotPair::default())
    }
}

impl<R> Stage<R> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Stage::Ready(_))
    }

    pub fn ready(&self) -> Option<&R> {
        match self {
            Stage::Ready(ready) => Some(ready),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut R> {
        match self {
            Stage::Ready(ready) => Some(ready),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&BootError> {
        match self {
            Stage::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn buffered(&self, slot: Slot) -> Option<&str> {
        match self {
            Stage::Loading(frames) | Stage::Failed { frames, .. } => Some(&frames[slot]),
            Stage::Ready(_) => None,
        }
    }

    pub fn buffered_mut(&mut self, slot: Slot) -> Option<&mut String> {
        match self {
            Stage::Loading(frames) | Stage::Failed { frames, .. } => Some(&mut frames[slot]),
            Stage::Ready(_) => None,
        }
    }

    pub fn complete(
        &mut self,
        result: Result<(), BootError>,
        build: impl FnOnce(SlotPair<String>) -> R,
    ) -> Result<(), EditorError> {
        let frames = match std::mem::take(self) {
            Stage::Loading(frames) => frames,
            settled => {
                *self = settled;
                return Err(EditorError::AlreadySettled);
            }
        };

        match result {
            Ok(()) => {
                *self = Stage::Ready(build(frames));
                Ok(())
            }
            Err(error) => {
                *self = Stage::Failed {
                    frames,
                    error: error.clone(),
                };
                Err(EditorError::Boot(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boot_error() -> BootError {
        BootError::Asset {
            asset: "core".into(),
            reason: "offline".into(),
        }
    }

    #[test]
    fn test_promotes_buffer_once() {
        let mut stage: Stage<SlotPair<String>> = Stage::default();
        stage.buffered_mut(Slot::Markup).unwrap().push_str("<h1>");

        stage.complete(Ok(()), |frames| frames).unwrap();
        assert!(stage.is_ready());
        assert_eq!(stage.ready().unwrap().markup, "<h1>");
        assert!(stage.buffered(Slot::Markup).is_none());

        assert_eq!(
            stage.complete(Ok(()), |frames| frames),
            Err(EditorError::AlreadySettled)
        );
        assert_eq!(stage.ready().unwrap().markup, "<h1>");
    }

    #[test]
    fn test_failure_keeps_buffer() {
        let mut stage: Stage<()> = Stage::default();
        stage.buffered_mut(Slot::Script).unwrap().push_str("x()");

        let err = stage.complete(Err(boot_error()), |_| ()).unwrap_err();
        assert_eq!(err, EditorError::Boot(boot_error()));
        assert!(!stage.is_ready());
        assert_eq!(stage.buffered(Slot::Script), Some("x()"));
        assert_eq!(stage.error(), Some(&boot_error()));

        assert_eq!(stage.complete(Ok(()), |_| ()), Err(EditorError::AlreadySettled));
        assert!(!stage.is_ready());
    }
}
