// Mon Oct 19 2026 - Alex

use crate::abi::FundamentalKind;
use crate::error::LayoutError;
use crate::registry::{ScopeId, TagKind, TypeRegistry};
use crate::types::{AggregateKind, TypeDescriptor};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static QUALIFIERS: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\b(?:const|volatile)\b").ok());

static EXPRESSION: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:(struct|class|union|enum)\s+)?((?:::\s*)?[A-Za-z_]\w*(?:\s*::\s*[A-Za-z_]\w*|\s+[A-Za-z_]\w*)*)\s*((?:\*\s*)*)((?:\[\s*\d+\s*\]\s*)*)$",
    )
    .ok()
});

static DIMENSION: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\[\s*(\d+)\s*\]").ok());

/// Parsed form of a query such as `const struct Node*`, `unsigned long`
/// or `Outer::Inner[4]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpression {
    pub elaborated: Option<TagKind>,
    pub base: String,
    pub pointer_depth: usize,
    /// Outermost first: `int[2][3]` is `[2, 3]`.
    pub dimensions: Vec<u64>,
}

impl TypeExpression {
    pub fn parse(input: &str) -> Result<Self, LayoutError> {
        let invalid = || LayoutError::InvalidExpression(input.trim().to_string());
        let (qualifiers, expression, dimension) = match (&*QUALIFIERS, &*EXPRESSION, &*DIMENSION) {
            (Some(q), Some(e), Some(d)) => (q, e, d),
            _ => return Err(invalid()),
        };

        let cleaned = qualifiers.replace_all(input, " ");
        let caps = expression.captures(&cleaned).ok_or_else(invalid)?;

        let elaborated = caps.get(1).map(|m| match m.as_str() {
            "struct" => TagKind::Aggregate(AggregateKind::Struct),
            "class" => TagKind::Aggregate(AggregateKind::Class),
            "union" => TagKind::Aggregate(AggregateKind::Union),
            _ => TagKind::Enum,
        });
        let base = caps
            .get(2)
            .map(|m| normalise_base(m.as_str()))
            .ok_or_else(invalid)?;
        let pointer_depth = caps.get(3).map_or(0, |m| m.as_str().matches('*').count());
        let dimensions = match caps.get(4) {
            Some(m) => dimension
                .captures_iter(m.as_str())
                .map(|d| d[1].parse::<u64>().map_err(|_| invalid()))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let keyword_in_base = base
            .split(|c: char| c == ':' || c.is_whitespace())
            .any(|word| matches!(word, "struct" | "class" | "union" | "enum"));
        if keyword_in_base || (elaborated.is_some() && base.contains(' ')) {
            return Err(invalid());
        }
        Ok(Self { elaborated, base, pointer_depth, dimensions })
    }

    pub fn is_named(&self) -> bool {
        self.pointer_depth == 0 && self.dimensions.is_empty()
    }

    /// The fundamental kind the base names, if any.
    pub fn fundamental(&self) -> Option<FundamentalKind> {
        match self.elaborated {
            Some(_) => None,
            None => FundamentalKind::from_spelling(&self.base),
        }
    }

    /// Resolve the base through `registry` (from global scope) and wrap it in
    /// the pointer and array declarators.
    pub fn resolve(&self, registry: &TypeRegistry) -> Result<TypeDescriptor, LayoutError> {
        let mut ty = match (self.fundamental(), self.elaborated) {
            (Some(kind), _) => TypeDescriptor::Fundamental(kind),
            (None, Some(keyword)) => {
                let id = registry.find_tag(ScopeId::GLOBAL, &self.base)?;
                match registry.entry(id).tag() {
                    Some(tag) if tag.is_compatible(keyword) => TypeDescriptor::NamedRef(id),
                    _ => return Err(LayoutError::UnknownType(format!("{} {}", keyword, self.base))),
                }
            }
            (None, None) => TypeDescriptor::NamedRef(registry.find(ScopeId::GLOBAL, &self.base)?),
        };
        for _ in 0..self.pointer_depth {
            ty = TypeDescriptor::pointer_to(ty);
        }
        for count in self.dimensions.iter().rev() {
            ty = TypeDescriptor::array_of(ty, *count);
        }
        Ok(ty)
    }
}

fn normalise_base(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for (i, part) in raw.split("::").enumerate() {
        if i > 0 {
            out.push_str("::");
        }
        out.push_str(&part.split_whitespace().collect::<Vec<_>>().join(" "));
    }
    out
}

impl fmt::Display for TypeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(keyword) = self.elaborated {
            write!(f, "{} ", keyword)?;
        }
        f.write_str(&self.base)?;
        for _ in 0..self.pointer_depth {
            f.write_str("*")?;
        }
        for count in &self.dimensions {
            write!(f, "[{}]", count)?;
        }
        Ok(())
    }
}
