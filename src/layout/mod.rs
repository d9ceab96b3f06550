// Mon Oct 19 2026 - Alex

pub mod bitfield;
pub mod cache;
pub mod engine;
pub mod policy;
pub mod result;

pub use bitfield::{BitfieldPacker, BitfieldPlacement, StorageUnit};
pub use cache::{CacheStats, LayoutCache, LayoutKey};
pub use engine::LayoutEngine;
pub use policy::{BaseLayoutPolicy, BasePlacement, ItaniumBaselinePolicy, PolicyKind, StrictSequentialPolicy};
pub use result::{BaseSubobject, FieldLayout, LayoutFlags, LayoutResult, PaddingRegion, StorageNote, VtablePointer};
