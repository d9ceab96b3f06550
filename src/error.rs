// Mon Oct 19 2026 - Alex

use thiserror::Error;

/// Every failure the registry, resolver, engine and query layer can report.
///
/// All variants carry the offending type or member name so a renderer can
/// print "size unavailable: <reason>" without further context.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("unknown type `{0}`")]
    UnknownType(String),
    #[error("incomplete type `{ty}`{}", member_suffix(.member))]
    IncompleteType { ty: String, member: Option<String> },
    #[error("duplicate definition of `{0}`")]
    DuplicateDefinition(String),
    #[error("invalid array element type `{0}` (element has size zero)")]
    InvalidArrayElement(String),
    #[error("`{aggregate}` directly contains itself through member `{member}`")]
    CyclicAggregate { aggregate: String, member: String },
    #[error("bit-field `{member}` has non-integral type `{ty}`")]
    UnsupportedBitfieldType { member: String, ty: String },
    #[error("bit-field `{member}` is {width} bits wide but its type holds only {max_bits}")]
    InvalidBitfieldWidth { member: String, width: u32, max_bits: u32 },
    #[error("`{aggregate}` does not fit in 64 bits at member `{member}`")]
    SizeOverflow { aggregate: String, member: String },
    #[error("invalid type expression `{0}`")]
    InvalidExpression(String),
    #[error("invalid ABI profile: {0}")]
    InvalidProfile(String),
}

fn member_suffix(member: &Option<String>) -> String {
    match member {
        Some(name) => format!(" (member `{}`)", name),
        None => String::new(),
    }
}

impl LayoutError {
    pub fn incomplete(ty: impl Into<String>) -> Self {
        Self::IncompleteType { ty: ty.into(), member: None }
    }

    pub fn incomplete_member(ty: impl Into<String>, member: impl Into<String>) -> Self {
        Self::IncompleteType { ty: ty.into(), member: Some(member.into()) }
    }

    /// Attach a member name to an `IncompleteType` that does not carry one yet.
    pub fn in_member(self, member: &str) -> Self {
        match self {
            Self::IncompleteType { ty, member: None } => Self::incomplete_member(ty, member),
            other => other,
        }
    }

    /// Short machine-friendly tag, used in JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownType(_) => "unknown_type",
            Self::IncompleteType { .. } => "incomplete_type",
            Self::DuplicateDefinition(_) => "duplicate_definition",
            Self::InvalidArrayElement(_) => "invalid_array_element",
            Self::CyclicAggregate { .. } => "cyclic_aggregate",
            Self::UnsupportedBitfieldType { .. } => "unsupported_bitfield_type",
            Self::InvalidBitfieldWidth { .. } => "invalid_bitfield_width",
            Self::SizeOverflow { .. } => "size_overflow",
            Self::InvalidExpression(_) => "invalid_expression",
            Self::InvalidProfile(_) => "invalid_profile",
        }
    }
}
