// Mon Oct 19 2026 - Alex

pub mod logging;

pub use logging::{LoggingUtils, ScopedTimer};

pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
