// Mon Oct 19 2026 - Alex

use crate::abi::FundamentalKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle of a registry entry (named aggregate, enum or typedef).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(u32);

impl TypeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    Struct,
    Class,
    Union,
}

impl AggregateKind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Class => "class",
            Self::Union => "union",
        }
    }

    pub fn is_union(self) -> bool {
        self == Self::Union
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A fully resolved type.
///
/// Named aggregates, enums and typedefs are reached through `NamedRef`, which
/// the layout engine follows lazily; this keeps pointer cycles finite.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Fundamental(FundamentalKind),
    Pointer(Box<TypeDescriptor>),
    Array(Box<TypeDescriptor>, u64),
    Enum(EnumType),
    /// Anonymous aggregate declared inline, e.g. `struct { int a; } inner;`.
    Aggregate(Box<AggregateType>),
    NamedRef(TypeId),
}

impl TypeDescriptor {
    pub fn pointer_to(pointee: TypeDescriptor) -> Self {
        Self::Pointer(Box::new(pointee))
    }

    pub fn array_of(element: TypeDescriptor, count: u64) -> Self {
        Self::Array(Box::new(element), count)
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Self::Pointer(_))
    }

    /// Strip array wrappers, returning the innermost element type.
    pub fn innermost_element(&self) -> &TypeDescriptor {
        match self {
            Self::Array(element, _) => element.innermost_element(),
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: Option<String>,
    pub underlying: FundamentalKind,
}

impl EnumType {
    pub fn new(name: Option<String>, underlying: Option<FundamentalKind>) -> Self {
        Self {
            name,
            underlying: underlying.unwrap_or(FundamentalKind::Int),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub ty: TypeDescriptor,
    pub bit_width: Option<u32>,
}

impl Member {
    pub fn new(name: &str, ty: TypeDescriptor) -> Self {
        Self {
            name: name.to_string(),
            ty,
            bit_width: None,
        }
    }

    pub fn bitfield(name: &str, ty: TypeDescriptor, width: u32) -> Self {
        Self {
            name: name.to_string(),
            ty,
            bit_width: Some(width),
        }
    }

    pub fn is_bitfield(&self) -> bool {
        self.bit_width.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BaseSpec {
    pub ty: TypeDescriptor,
    pub is_virtual: bool,
}

impl BaseSpec {
    pub fn new(ty: TypeDescriptor) -> Self {
        Self { ty, is_virtual: false }
    }

    pub fn virtual_base(ty: TypeDescriptor) -> Self {
        Self { ty, is_virtual: true }
    }
}

/// Body of a struct, class or union.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateType {
    pub kind: AggregateKind,
    pub name: Option<String>,
    pub members: Vec<Member>,
    /// Declaration order; significant to layout.
    pub bases: Vec<BaseSpec>,
    /// Names of virtual functions declared (or overridden) in this body.
    pub virtual_functions: Vec<String>,
}

impl AggregateType {
    pub fn new(kind: AggregateKind, name: Option<&str>) -> Self {
        Self {
            kind,
            name: name.map(|n| n.to_string()),
            members: Vec::new(),
            bases: Vec::new(),
            virtual_functions: Vec::new(),
        }
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_base(mut self, base: BaseSpec) -> Self {
        self.bases.push(base);
        self
    }

    pub fn with_virtual_function(mut self, name: &str) -> Self {
        self.virtual_functions.push(name.to_string());
        self
    }

    pub fn declares_virtual(&self) -> bool {
        !self.virtual_functions.is_empty()
    }

    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => format!("{} {}", self.kind, name),
            None => format!("{} (anonymous)", self.kind),
        }
    }
}
