pub trait Telemetry {
    fn emit(&self, category: &str, action: &str, label: Option<&str>);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogTelemetry;

impl Telemetry for LogTelemetry {
    fn emit(&self, category: &str, action: &str, label: Option<&str>) {
        match label {
            Some(label) => log::info!(target: "telemetry", "{}/{} {}", category, action, label),
            None => log::info!(target: "telemetry", "{}/{}", category, action),
        }
    }
}

#[cfg(test)]
pub use recorded::RecordedTelemetry;

#[cfg(test)]
mod recorded {
    use std::cell::RefCell;

    use super::Telemetry;

    #[derive(Debug, Default)]
    pub struct RecordedTelemetry {
        events: RefCell<Vec<String>>,
    }

    impl RecordedTelemetry {
        pub fn events(&self) -> Vec<String> {
            self.events.borrow().clone()
        }
    }

    impl Telemetry for RecordedTelemetry {
        fn emit(&self, category: &str, action: &str, label: Option<&str>) {
            let mut event = format!("{}/{}", category, action);
            if let Some(label) = label {
                event.push(' ');
                event.push_str(label);
            }
            self.events.borrow_mut().push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_events() {
        let sink = RecordedTelemetry::default();
        sink.emit("editor", "save", None);
        sink.emit("preview", "refresh", Some("manual"));
        LogTelemetry.emit("editor", "save", None);
        assert_eq!(sink.events(), vec!["editor/save", "preview/refresh manual"]);
    }
}
