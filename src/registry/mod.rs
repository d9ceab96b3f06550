// Mon Oct 19 2026 - Alex

pub mod entry;
pub mod prelude;
pub mod registry;
pub mod scope;

pub use entry::{Definition, EntryState, TagKind, TypeEntry};
pub use prelude::{builtin_typedef, BUILTIN_TYPEDEFS};
pub use registry::TypeRegistry;
pub use scope::{Scope, ScopeId};
