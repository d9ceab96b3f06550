// Mon Oct 19 2026 - Alex

pub mod formatter;
pub mod json;

pub use formatter::{OffsetFormat, ReportFormatter};
pub use json::{JsonError, JsonExporter};
