// Mon Oct 19 2026 - Alex

use crate::types::TypeId;
use indexmap::IndexMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    pub const GLOBAL: ScopeId = ScopeId(0);

    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_global(self) -> bool {
        self == Self::GLOBAL
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// One level of the declaration nesting tree.
///
/// Tags (`struct Node`) and typedef names live in separate namespaces, so
/// `typedef struct Node { .. } Node;` binds both. Maps keep insertion order
/// so dumps list types the way they were declared.
#[derive(Debug, Clone)]
pub struct Scope {
    pub(crate) parent: Option<ScopeId>,
    pub(crate) owner: Option<TypeId>,
    pub(crate) tags: IndexMap<String, TypeId>,
    pub(crate) typedefs: IndexMap<String, TypeId>,
}

impl Scope {
    pub(crate) fn root() -> Self {
        Self {
            parent: None,
            owner: None,
            tags: IndexMap::new(),
            typedefs: IndexMap::new(),
        }
    }

    pub(crate) fn child(parent: ScopeId, owner: TypeId) -> Self {
        Self {
            parent: Some(parent),
            owner: Some(owner),
            tags: IndexMap::new(),
            typedefs: IndexMap::new(),
        }
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn owner(&self) -> Option<TypeId> {
        self.owner
    }

    /// Ordinary lookup: a typedef name wins over a tag of the same spelling.
    pub fn get(&self, name: &str) -> Option<TypeId> {
        self.typedefs.get(name).or_else(|| self.tags.get(name)).copied()
    }

    pub fn tag(&self, name: &str) -> Option<TypeId> {
        self.tags.get(name).copied()
    }

    pub fn typedef(&self, name: &str) -> Option<TypeId> {
        self.typedefs.get(name).copied()
    }

    pub fn tags(&self) -> impl Iterator<Item = (&str, TypeId)> {
        self.tags.iter().map(|(name, id)| (name.as_str(), *id))
    }
}

/// Split `A::B::C` into components; a leading `::` anchors at global scope.
pub fn split_path(path: &str) -> (bool, Vec<&str>) {
    let trimmed = path.trim();
    let anchored = trimmed.starts_with("::");
    let parts = trimmed
        .trim_start_matches("::")
        .split("::")
        .map(str::trim)
        .collect();
    (anchored, parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("Outer::Inner"), (false, vec!["Outer", "Inner"]));
        assert_eq!(split_path("::Point"), (true, vec!["Point"]));
        assert_eq!(split_path(" Node "), (false, vec!["Node"]));
    }
}
