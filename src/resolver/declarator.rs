// Mon Oct 19 2026 - Alex

use crate::registry::TagKind;
use crate::types::AggregateKind;
use serde::{Deserialize, Serialize};

/// Shape of a type as handed over by a C/C++-aware front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declarator {
    Fundamental { spelling: String },
    Named { name: String },
    Pointer { pointee: Box<Declarator> },
    Array { element: Box<Declarator>, count: u64 },
    Record(RecordDecl),
    Enum(EnumDecl),
}

impl Declarator {
    pub fn fundamental(spelling: &str) -> Self {
        Self::Fundamental { spelling: spelling.to_string() }
    }

    pub fn named(name: &str) -> Self {
        Self::Named { name: name.to_string() }
    }

    pub fn pointer(self) -> Self {
        Self::Pointer { pointee: Box::new(self) }
    }

    pub fn array(self, count: u64) -> Self {
        Self::Array { element: Box::new(self), count }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDecl {
    pub name: String,
    pub ty: Declarator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseDecl {
    pub name: String,
    #[serde(default)]
    pub is_virtual: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDecl {
    pub tag: AggregateKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bases: Vec<BaseDecl>,
    #[serde(default)]
    pub members: Vec<MemberDecl>,
    #[serde(default)]
    pub virtual_functions: Vec<String>,
    /// Declarations appearing inside the body (`class Outer { class Inner {..}; }`).
    #[serde(default)]
    pub nested: Vec<Declaration>,
}

impl RecordDecl {
    pub fn new(tag: AggregateKind, name: Option<&str>) -> Self {
        Self {
            tag,
            name: name.map(str::to_string),
            bases: Vec::new(),
            members: Vec::new(),
            virtual_functions: Vec::new(),
            nested: Vec::new(),
        }
    }

    pub fn member(mut self, name: &str, ty: Declarator) -> Self {
        self.members.push(MemberDecl { name: name.to_string(), ty, bit_width: None });
        self
    }

    pub fn bitfield(mut self, name: &str, ty: Declarator, width: u32) -> Self {
        self.members.push(MemberDecl { name: name.to_string(), ty, bit_width: Some(width) });
        self
    }

    pub fn base(mut self, name: &str) -> Self {
        self.bases.push(BaseDecl { name: name.to_string(), is_virtual: false });
        self
    }

    pub fn virtual_base(mut self, name: &str) -> Self {
        self.bases.push(BaseDecl { name: name.to_string(), is_virtual: true });
        self
    }

    pub fn virtual_function(mut self, name: &str) -> Self {
        self.virtual_functions.push(name.to_string());
        self
    }

    pub fn nested(mut self, declaration: Declaration) -> Self {
        self.nested.push(declaration);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDecl {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub underlying: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForwardTag {
    Struct,
    Class,
    Union,
    Enum,
}

impl From<ForwardTag> for TagKind {
    fn from(tag: ForwardTag) -> Self {
        match tag {
            ForwardTag::Struct => TagKind::Aggregate(AggregateKind::Struct),
            ForwardTag::Class => TagKind::Aggregate(AggregateKind::Class),
            ForwardTag::Union => TagKind::Aggregate(AggregateKind::Union),
            ForwardTag::Enum => TagKind::Enum,
        }
    }
}

/// A top-level (or nested) declaration in a source unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
    Record(RecordDecl),
    Forward { tag: ForwardTag, name: String },
    Enum(EnumDecl),
    Typedef { name: String, target: Declarator },
}

impl Declaration {
    pub fn forward(tag: ForwardTag, name: &str) -> Self {
        Self::Forward { tag, name: name.to_string() }
    }

    pub fn typedef(name: &str, target: Declarator) -> Self {
        Self::Typedef { name: name.to_string(), target }
    }

    pub fn enumeration(name: &str, underlying: Option<&str>) -> Self {
        Self::Enum(EnumDecl {
            name: Some(name.to_string()),
            underlying: underlying.map(str::to_string),
        })
    }

    /// Name this declaration binds, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Record(record) => record.name.as_deref(),
            Self::Forward { name, .. } | Self::Typedef { name, .. } => Some(name),
            Self::Enum(decl) => decl.name.as_deref(),
        }
    }
}

impl From<RecordDecl> for Declaration {
    fn from(record: RecordDecl) -> Self {
        Self::Record(record)
    }
}

/// Every declaration of one translation unit, in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceUnit {
    pub declarations: Vec<Declaration>,
}

impl SourceUnit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, declaration: impl Into<Declaration>) -> Self {
        self.declarations.push(declaration.into());
        self
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_from_json() {
        let text = r#"{
            "declarations": [
                { "kind": "forward", "tag": "struct", "name": "Node" },
                { "kind": "record", "tag": "struct", "name": "Node", "members": [
                    { "name": "value", "ty": { "kind": "fundamental", "spelling": "int" } },
                    { "name": "next", "ty": { "kind": "pointer", "pointee": { "kind": "named", "name": "Node" } } },
                    { "name": "flags", "ty": { "kind": "fundamental", "spelling": "unsigned int" }, "bit_width": 3 }
                ] },
                { "kind": "typedef", "name": "NodePtr", "target": { "kind": "pointer", "pointee": { "kind": "named", "name": "Node" } } },
                { "kind": "enum", "name": "Color" }
            ]
        }"#;
        let unit = SourceUnit::from_json(text).unwrap();
        assert_eq!(unit.declarations.len(), 4);
        assert_eq!(unit.declarations[0], Declaration::forward(ForwardTag::Struct, "Node"));
        match &unit.declarations[1] {
            Declaration::Record(record) => {
                assert_eq!(record.tag, AggregateKind::Struct);
                assert_eq!(record.members[1].ty, Declarator::named("Node").pointer());
                assert_eq!(record.members[2].bit_width, Some(3));
                assert!(record.bases.is_empty());
            }
            other => panic!("expected record, got {:?}", other),
        }
        assert_eq!(unit.declarations[3].name(), Some("Color"));
    }

    #[test]
    fn test_inline_record_declarator() {
        let text = r#"{ "kind": "array", "count": 2, "element":
            { "kind": "record", "tag": "union", "members": [
                { "name": "i", "ty": { "kind": "fundamental", "spelling": "int" } }
            ] } }"#;
        let declarator: Declarator = serde_json::from_str(text).unwrap();
        let expected = Declarator::Record(
            RecordDecl::new(AggregateKind::Union, None).member("i", Declarator::fundamental("int")),
        )
        .array(2);
        assert_eq!(declarator, expected);
    }

    #[test]
    fn test_json_export_reloads() {
        let unit = SourceUnit::new().with(
            RecordDecl::new(AggregateKind::Class, Some("Shape"))
                .virtual_function("draw")
                .member("color", Declarator::fundamental("int")),
        );
        let text = unit.to_json().unwrap();
        assert_eq!(SourceUnit::from_json(&text).unwrap(), unit);
    }
}
