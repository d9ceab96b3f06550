// Mon Oct 19 2026 - Alex

use crate::registry::ScopeId;
use crate::types::{AggregateKind, AggregateType, EnumType, TypeDescriptor};
use std::fmt;

/// What kind of name a forward declaration introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Aggregate(AggregateKind),
    Enum,
}

impl TagKind {
    /// `struct` and `class` tags name the same kind of entity.
    pub fn is_compatible(self, other: TagKind) -> bool {
        match (self, other) {
            (Self::Aggregate(a), Self::Aggregate(b)) => a.is_union() == b.is_union(),
            (Self::Enum, Self::Enum) => true,
            _ => false,
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aggregate(kind) => write!(f, "{}", kind),
            Self::Enum => f.write_str("enum"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Aggregate(AggregateType),
    Enum(EnumType),
    Typedef(TypeDescriptor),
}

impl Definition {
    pub fn tag(&self) -> Option<TagKind> {
        match self {
            Self::Aggregate(agg) => Some(TagKind::Aggregate(agg.kind)),
            Self::Enum(_) => Some(TagKind::Enum),
            Self::Typedef(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryState {
    /// Declared (`struct Node;`) but no body seen yet.
    Forward(TagKind),
    Defined(Definition),
}

#[derive(Debug, Clone)]
pub struct TypeEntry {
    pub(crate) name: String,
    pub(crate) scope: ScopeId,
    pub(crate) state: EntryState,
    /// Scope holding declarations nested in this aggregate's body.
    pub(crate) body_scope: Option<ScopeId>,
}

impl TypeEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    pub fn state(&self) -> &EntryState {
        &self.state
    }

    pub fn body_scope(&self) -> Option<ScopeId> {
        self.body_scope
    }

    pub fn definition(&self) -> Option<&Definition> {
        match &self.state {
            EntryState::Defined(def) => Some(def),
            EntryState::Forward(_) => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.definition().is_some()
    }

    pub fn is_aggregate(&self) -> bool {
        match &self.state {
            EntryState::Forward(tag) => matches!(tag, TagKind::Aggregate(_)),
            EntryState::Defined(def) => matches!(def, Definition::Aggregate(_)),
        }
    }

    pub fn tag(&self) -> Option<TagKind> {
        match &self.state {
            EntryState::Forward(tag) => Some(*tag),
            EntryState::Defined(def) => def.tag(),
        }
    }
}
