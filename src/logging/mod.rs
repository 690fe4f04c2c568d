mod format;

pub use format::{ScanRecord, StructuredLogger};
