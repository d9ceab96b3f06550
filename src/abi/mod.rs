// Mon Oct 19 2026 - Alex

pub mod alignment;
pub mod fundamental;
pub mod profile;

pub use alignment::Alignment;
pub use fundamental::{FundamentalKind, SizeClass};
pub use profile::{AbiProfile, FundamentalLayout, ProfileBuilder, ProfileKey};
