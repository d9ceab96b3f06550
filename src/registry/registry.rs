// Mon Oct 19 2026 - Alex

use crate::error::LayoutError;
use crate::registry::entry::{Definition, EntryState, TagKind, TypeEntry};
use crate::registry::prelude::BUILTIN_TYPEDEFS;
use crate::registry::scope::{split_path, Scope, ScopeId};
use crate::types::{TypeDescriptor, TypeId};

/// Arena of named types for one source unit, plus the scope tree that mirrors
/// declaration nesting.
///
/// Invariants:
/// - entries are never removed, so a `TypeId` stays valid for the registry's lifetime
/// - a name is bound at most once per namespace (tags, typedefs) per scope
/// - once frozen into a snapshot the registry is only read
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    entries: Vec<TypeEntry>,
    scopes: Vec<Scope>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            scopes: vec![Scope::root()],
        }
    }

    /// A registry with `size_t`, `uint32_t` and the other standard typedefs bound.
    pub fn with_prelude() -> Self {
        let mut registry = Self::new();
        for (name, kind) in BUILTIN_TYPEDEFS {
            registry.alloc(ScopeId::GLOBAL, name, EntryState::Defined(Definition::Typedef(TypeDescriptor::Fundamental(*kind))));
        }
        registry
    }

    pub fn global(&self) -> ScopeId {
        ScopeId::GLOBAL
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn alloc(&mut self, scope: ScopeId, name: &str, state: EntryState) -> TypeId {
        let id = TypeId::new(self.entries.len());
        let is_aggregate = matches!(
            state,
            EntryState::Forward(TagKind::Aggregate(_)) | EntryState::Defined(Definition::Aggregate(_))
        );
        let is_typedef = matches!(state, EntryState::Defined(Definition::Typedef(_)));
        let body_scope = if is_aggregate {
            self.scopes.push(Scope::child(scope, id));
            Some(ScopeId::new(self.scopes.len() - 1))
        } else {
            None
        };
        self.entries.push(TypeEntry {
            name: name.to_string(),
            scope,
            state,
            body_scope,
        });
        let target = &mut self.scopes[scope.index()];
        if is_typedef {
            target.typedefs.insert(name.to_string(), id);
        } else {
            target.tags.insert(name.to_string(), id);
        }
        id
    }

    /// Introduce `name` as a forward-declared aggregate or enum.
    ///
    /// Re-declaring an existing tag is a no-op returning the same id.
    pub fn declare(&mut self, scope: ScopeId, name: &str, tag: TagKind) -> Result<TypeId, LayoutError> {
        if let Some(existing) = self.scopes[scope.index()].tag(name) {
            return match self.entries[existing.index()].tag() {
                Some(current) if current.is_compatible(tag) => Ok(existing),
                _ => Err(LayoutError::DuplicateDefinition(self.qualified_name(existing))),
            };
        }
        Ok(self.alloc(scope, name, EntryState::Forward(tag)))
    }

    /// Bind `name` to a definition, completing a forward declaration if present.
    pub fn define(&mut self, scope: ScopeId, name: &str, definition: Definition) -> Result<TypeId, LayoutError> {
        let bound = match &definition {
            Definition::Typedef(_) => self.scopes[scope.index()].typedef(name),
            _ => self.scopes[scope.index()].tag(name),
        };
        if let Some(existing) = bound {
            let forward = match &self.entries[existing.index()].state {
                EntryState::Forward(tag) => Some(*tag),
                EntryState::Defined(_) => None,
            };
            let compatible = match (forward, definition.tag()) {
                (Some(forward), Some(tag)) => forward.is_compatible(tag),
                _ => false,
            };
            if compatible {
                log::trace!("completing forward declaration of {}", name);
                self.entries[existing.index()].state = EntryState::Defined(definition);
                return Ok(existing);
            }
            return Err(LayoutError::DuplicateDefinition(self.qualified_name(existing)));
        }
        Ok(self.alloc(scope, name, EntryState::Defined(definition)))
    }

    /// Resolve a possibly qualified name to an entry, complete or not.
    pub fn find(&self, scope: ScopeId, path: &str) -> Result<TypeId, LayoutError> {
        let (anchored, parts) = split_path(path);
        let unknown = || LayoutError::UnknownType(path.trim().to_string());
        let (first, rest) = parts.split_first().ok_or_else(unknown)?;
        if first.is_empty() {
            return Err(unknown());
        }

        let mut current = if anchored {
            self.scopes[ScopeId::GLOBAL.index()].get(first)
        } else {
            self.find_outward(scope, first)
        }
        .ok_or_else(unknown)?;

        for part in rest {
            let body = self.entries[current.index()].body_scope.ok_or_else(unknown)?;
            current = self.scopes[body.index()].get(part).ok_or_else(unknown)?;
        }
        Ok(current)
    }

    fn find_outward(&self, scope: ScopeId, name: &str) -> Option<TypeId> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            let scope = &self.scopes[id.index()];
            if let Some(found) = scope.get(name) {
                return Some(found);
            }
            cursor = scope.parent;
        }
        None
    }

    /// Elaborated lookup (`struct Node`): only tags are considered for the
    /// last path component.
    pub fn find_tag(&self, scope: ScopeId, path: &str) -> Result<TypeId, LayoutError> {
        let (anchored, parts) = split_path(path);
        let unknown = || LayoutError::UnknownType(path.trim().to_string());
        let (last, outer) = parts.split_last().ok_or_else(unknown)?;
        if outer.is_empty() {
            let mut cursor = if anchored { Some(ScopeId::GLOBAL) } else { Some(scope) };
            while let Some(id) = cursor {
                if let Some(found) = self.scopes[id.index()].tag(last) {
                    return Ok(found);
                }
                cursor = if anchored { None } else { self.scopes[id.index()].parent };
            }
            return Err(unknown());
        }
        let prefix = format!("{}{}", if anchored { "::" } else { "" }, outer.join("::"));
        let owner = self.find(scope, &prefix).map_err(|_| unknown())?;
        let body = self.entries[owner.index()].body_scope.ok_or_else(unknown)?;
        self.scopes[body.index()].tag(last).ok_or_else(unknown)
    }

    /// Like [`find`](Self::find) but also requires a body.
    pub fn lookup(&self, scope: ScopeId, path: &str) -> Result<TypeId, LayoutError> {
        let id = self.find(scope, path)?;
        self.definition(id)?;
        Ok(id)
    }

    pub fn entry(&self, id: TypeId) -> &TypeEntry {
        &self.entries[id.index()]
    }

    pub fn definition(&self, id: TypeId) -> Result<&Definition, LayoutError> {
        self.entries[id.index()]
            .definition()
            .ok_or_else(|| LayoutError::incomplete(self.display_name(id)))
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    /// `Outer::Inner` style name of an entry.
    pub fn qualified_name(&self, id: TypeId) -> String {
        let mut parts = vec![self.entries[id.index()].name.clone()];
        let mut scope = self.entries[id.index()].scope;
        while let Some(owner) = self.scopes[scope.index()].owner {
            parts.push(self.entries[owner.index()].name.clone());
            scope = self.entries[owner.index()].scope;
        }
        parts.reverse();
        parts.join("::")
    }

    /// Qualified name prefixed with its tag keyword, e.g. `class Shape`.
    pub fn display_name(&self, id: TypeId) -> String {
        let name = self.qualified_name(id);
        match self.entries[id.index()].tag() {
            Some(tag) => format!("{} {}", tag, name),
            None => name,
        }
    }

    /// Render a descriptor in C-like syntax.
    pub fn type_name(&self, ty: &TypeDescriptor) -> String {
        match ty {
            TypeDescriptor::Fundamental(kind) => kind.spelling().to_string(),
            TypeDescriptor::Pointer(pointee) => format!("{}*", self.type_name(pointee)),
            TypeDescriptor::Array(element, count) => {
                let mut dims = format!("[{}]", count);
                let mut inner = element.as_ref();
                while let TypeDescriptor::Array(next, n) = inner {
                    dims.push_str(&format!("[{}]", n));
                    inner = next;
                }
                format!("{}{}", self.type_name(inner), dims)
            }
            TypeDescriptor::Enum(e) => match &e.name {
                Some(name) => format!("enum {}", name),
                None => "enum (anonymous)".to_string(),
            },
            TypeDescriptor::Aggregate(agg) => agg.display_name(),
            TypeDescriptor::NamedRef(id) => self.qualified_name(*id),
        }
    }

    /// Every entry, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeEntry)> {
        self.entries.iter().enumerate().map(|(i, e)| (TypeId::new(i), e))
    }

    /// Ids of all aggregates that have a body.
    pub fn defined_aggregates(&self) -> Vec<TypeId> {
        self.iter()
            .filter(|(_, e)| matches!(e.definition(), Some(Definition::Aggregate(_))))
            .map(|(id, _)| id)
            .collect()
    }
}
