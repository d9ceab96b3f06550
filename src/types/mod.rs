// Mon Oct 19 2026 - Alex

pub mod descriptor;

pub use descriptor::{AggregateKind, AggregateType, BaseSpec, EnumType, Member, TypeDescriptor, TypeId};
