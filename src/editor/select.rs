use std::sync::LazyLock;

use regex::Regex;

use super::ide::IdeEditor;
use super::lite::LiteEditor;
use super::traits::{BackendKind, EditorCore};

static TOUCH_AGENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(Android|iPhone|iPad|iPod)").expect("Invalid touch agent regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Touch,
    Desktop,
}

impl DeviceClass {
    pub fn from_user_agent(user_agent: &str) -> Self {
        if TOUCH_AGENTS.is_match(user_agent) {
            DeviceClass::Touch
        } else {
            DeviceClass::Desktop
        }
    }
}

pub fn select_backend(device: DeviceClass, forced: Option<BackendKind>) -> BackendKind {
    if let Some(kind) = forced {
        return kind;
    }
    match device {
        DeviceClass::Touch => BackendKind::Lite,
        DeviceClass::Desktop => BackendKind::Ide,
    }
}

pub fn create_core(kind: BackendKind) -> Box<dyn EditorCore> {
    log::debug!("creating {} editor core", kind);
    match kind {
        BackendKind::Ide => Box::new(IdeEditor::new()),
        BackendKind::Lite => Box::new(LiteEditor::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_from_user_agent() {
        let cases = [
            ("Mozilla/5.0 (Linux; Android 13; Pixel 7)", DeviceClass::Touch),
            ("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0)", DeviceClass::Touch),
            ("Mozilla/5.0 (iPad; CPU OS 16_6)", DeviceClass::Touch),
            ("Mozilla/5.0 (X11; Linux x86_64)", DeviceClass::Desktop),
            ("", DeviceClass::Desktop),
        ];
        for (agent, expected) in cases {
            assert_eq!(DeviceClass::from_user_agent(agent), expected, "{}", agent);
        }
    }

    #[test]
    fn test_select_backend() {
        assert_eq!(select_backend(DeviceClass::Touch, None), BackendKind::Lite);
        assert_eq!(select_backend(DeviceClass::Desktop, None), BackendKind::Ide);
        assert_eq!(
            select_backend(DeviceClass::Touch, Some(BackendKind::Ide)),
            BackendKind::Ide
        );
    }

    #[test]
    fn test_create_core_kind() {
        assert_eq!(create_core(BackendKind::Lite).kind(), BackendKind::Lite);
        let core = create_core(BackendKind::Ide);
        assert_eq!(core.kind(), BackendKind::Ide);
        assert!(!core.is_ready());
    }
}
