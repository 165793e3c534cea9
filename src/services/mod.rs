pub mod store;
pub mod telemetry;

pub use store::{ContentStore, FsStore, MemoryStore, StoreError};
pub use telemetry::{LogTelemetry, Telemetry};

#[cfg(test)]
pub use telemetry::RecordedTelemetry;
