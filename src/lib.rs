// Mon Oct 19 2026 - Alex

pub mod abi;
pub mod config;
pub mod error;
pub mod layout;
pub mod output;
pub mod query;
pub mod registry;
pub mod resolver;
pub mod types;
pub mod ui;
pub mod utils;

pub use abi::{AbiProfile, FundamentalKind};
pub use config::Config;
pub use error::LayoutError;
pub use layout::{LayoutEngine, LayoutResult, PolicyKind};
pub use query::{LayoutReport, LayoutSession};
pub use registry::TypeRegistry;
pub use resolver::{resolve_declarations, SourceUnit};
pub use types::{TypeDescriptor, TypeId};
