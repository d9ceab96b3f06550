// Mon Oct 19 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every C/C++ fundamental type the engine understands.
///
/// Signed and unsigned spellings are distinct kinds but share a [`SizeClass`],
/// so a profile only has to describe ten entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundamentalKind {
    Void,
    Bool,
    Char,
    SignedChar,
    UnsignedChar,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
    Float,
    Double,
    LongDouble,
    WChar,
    /// Signed integer as wide as a data pointer (`intptr_t`, `ptrdiff_t`).
    PointerInt,
    UnsignedPointerInt,
}

/// The profile-table row a fundamental kind takes its size and alignment from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Char,
    Short,
    Int,
    Long,
    LongLong,
    Float,
    Double,
    LongDouble,
    Bool,
    WChar,
}

impl SizeClass {
    pub const COUNT: usize = 10;

    pub const ALL: [SizeClass; SizeClass::COUNT] = [
        SizeClass::Char,
        SizeClass::Short,
        SizeClass::Int,
        SizeClass::Long,
        SizeClass::LongLong,
        SizeClass::Float,
        SizeClass::Double,
        SizeClass::LongDouble,
        SizeClass::Bool,
        SizeClass::WChar,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn spelling(self) -> &'static str {
        match self {
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::LongLong => "long long",
            Self::Float => "float",
            Self::Double => "double",
            Self::LongDouble => "long double",
            Self::Bool => "bool",
            Self::WChar => "wchar_t",
        }
    }

    /// Parse a profile-override key such as `"long double"`.
    pub fn from_spelling(spelling: &str) -> Option<Self> {
        let kind = FundamentalKind::from_spelling(spelling)?;
        kind.size_class()
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spelling())
    }
}

impl FundamentalKind {
    /// Normalise a C/C++ specifier sequence (`"unsigned long int"`, `"signed"`,
    /// `"_Bool"`, ...) to a kind. Specifier order does not matter.
    pub fn from_spelling(spelling: &str) -> Option<Self> {
        let mut longs = 0u8;
        let mut signed = false;
        let mut unsigned = false;
        let mut short = false;
        let mut int = false;
        let mut base: Option<&str> = None;

        for word in spelling.split_whitespace() {
            match word {
                "long" => longs += 1,
                "signed" if !signed => signed = true,
                "unsigned" if !unsigned => unsigned = true,
                "short" if !short => short = true,
                "int" if !int => int = true,
                "char" | "float" | "double" | "bool" | "_Bool" | "wchar_t" | "void" if base.is_none() => {
                    base = Some(word)
                }
                _ => return None,
            }
        }

        if signed && unsigned || longs > 2 || (short && longs > 0) {
            return None;
        }
        let sign_given = signed || unsigned;

        match base {
            Some("char") if !short && !int && longs == 0 => Some(if signed {
                Self::SignedChar
            } else if unsigned {
                Self::UnsignedChar
            } else {
                Self::Char
            }),
            Some("double") if !sign_given && !short && !int => match longs {
                0 => Some(Self::Double),
                1 => Some(Self::LongDouble),
                _ => None,
            },
            Some(_) if sign_given || short || int || longs > 0 => None,
            Some("float") => Some(Self::Float),
            Some("bool") | Some("_Bool") => Some(Self::Bool),
            Some("wchar_t") => Some(Self::WChar),
            Some("void") => Some(Self::Void),
            Some(_) => None,
            None if short => Some(if unsigned { Self::UnsignedShort } else { Self::Short }),
            None if longs == 2 => Some(if unsigned { Self::UnsignedLongLong } else { Self::LongLong }),
            None if longs == 1 => Some(if unsigned { Self::UnsignedLong } else { Self::Long }),
            None if int || sign_given => Some(if unsigned { Self::UnsignedInt } else { Self::Int }),
            None => None,
        }
    }

    pub fn spelling(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Bool => "bool",
            Self::Char => "char",
            Self::SignedChar => "signed char",
            Self::UnsignedChar => "unsigned char",
            Self::Short => "short",
            Self::UnsignedShort => "unsigned short",
            Self::Int => "int",
            Self::UnsignedInt => "unsigned int",
            Self::Long => "long",
            Self::UnsignedLong => "unsigned long",
            Self::LongLong => "long long",
            Self::UnsignedLongLong => "unsigned long long",
            Self::Float => "float",
            Self::Double => "double",
            Self::LongDouble => "long double",
            Self::WChar => "wchar_t",
            Self::PointerInt => "__intptr",
            Self::UnsignedPointerInt => "__uintptr",
        }
    }

    /// `None` for `void`, which has no size, and for the pointer-width kinds,
    /// whose row depends on the profile (see `AbiProfile::class_of`).
    pub fn size_class(self) -> Option<SizeClass> {
        match self {
            Self::Void | Self::PointerInt | Self::UnsignedPointerInt => None,
            Self::Bool => Some(SizeClass::Bool),
            Self::Char | Self::SignedChar | Self::UnsignedChar => Some(SizeClass::Char),
            Self::Short | Self::UnsignedShort => Some(SizeClass::Short),
            Self::Int | Self::UnsignedInt => Some(SizeClass::Int),
            Self::Long | Self::UnsignedLong => Some(SizeClass::Long),
            Self::LongLong | Self::UnsignedLongLong => Some(SizeClass::LongLong),
            Self::Float => Some(SizeClass::Float),
            Self::Double => Some(SizeClass::Double),
            Self::LongDouble => Some(SizeClass::LongDouble),
            Self::WChar => Some(SizeClass::WChar),
        }
    }

    /// Integral types are the only legal bit-field types.
    pub fn is_integral(self) -> bool {
        !matches!(self, Self::Void | Self::Float | Self::Double | Self::LongDouble)
    }

    pub fn is_pointer_width(self) -> bool {
        matches!(self, Self::PointerInt | Self::UnsignedPointerInt)
    }

    pub fn is_floating(self) -> bool {
        matches!(self, Self::Float | Self::Double | Self::LongDouble)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Void => "Incomplete type with no size",
            Self::Bool => "Boolean type",
            Self::Char => "Character type, always 1 byte",
            Self::SignedChar => "Signed character (-128 to 127)",
            Self::UnsignedChar => "Unsigned character (0 to 255)",
            Self::Short => "Short integer, typically 16-bit",
            Self::UnsignedShort => "Unsigned short integer",
            Self::Int => "Standard integer, typically 32-bit",
            Self::UnsignedInt => "Unsigned integer, typically 32-bit",
            Self::Long => "Long integer (platform dependent)",
            Self::UnsignedLong => "Unsigned long integer (platform dependent)",
            Self::LongLong => "Long long integer, always at least 64-bit",
            Self::UnsignedLongLong => "Unsigned long long integer",
            Self::Float => "Single precision floating point (IEEE 754)",
            Self::Double => "Double precision floating point (IEEE 754)",
            Self::LongDouble => "Extended precision floating point",
            Self::WChar => "Wide character type",
            Self::PointerInt => "Signed integer as wide as a pointer (platform dependent)",
            Self::UnsignedPointerInt => "Unsigned integer as wide as a pointer (platform dependent)",
        }
    }
}

impl fmt::Display for FundamentalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spelling())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spelling_variants_normalise() {
        let cases = [
            ("char", FundamentalKind::Char),
            ("signed char", FundamentalKind::SignedChar),
            ("char unsigned", FundamentalKind::UnsignedChar),
            ("short int", FundamentalKind::Short),
            ("unsigned short int", FundamentalKind::UnsignedShort),
            ("signed", FundamentalKind::Int),
            ("unsigned", FundamentalKind::UnsignedInt),
            ("signed long int", FundamentalKind::Long),
            ("long unsigned", FundamentalKind::UnsignedLong),
            ("long long int", FundamentalKind::LongLong),
            ("unsigned long long", FundamentalKind::UnsignedLongLong),
            ("long double", FundamentalKind::LongDouble),
            ("_Bool", FundamentalKind::Bool),
            ("wchar_t", FundamentalKind::WChar),
            ("void", FundamentalKind::Void),
        ];
        for (spelling, expected) in cases {
            assert_eq!(FundamentalKind::from_spelling(spelling), Some(expected), "{}", spelling);
        }
    }

    #[test]
    fn test_invalid_spellings_rejected() {
        for spelling in ["", "signed unsigned", "long long long", "short long", "unsigned float", "int int", "Point", "long char"] {
            assert_eq!(FundamentalKind::from_spelling(spelling), None, "{}", spelling);
        }
    }

    #[test]
    fn test_size_classes_share_rows() {
        assert_eq!(FundamentalKind::UnsignedLong.size_class(), Some(SizeClass::Long));
        assert_eq!(FundamentalKind::SignedChar.size_class(), Some(SizeClass::Char));
        assert_eq!(FundamentalKind::Void.size_class(), None);
        assert_eq!(FundamentalKind::PointerInt.size_class(), None);
        assert_eq!(SizeClass::from_spelling("long double"), Some(SizeClass::LongDouble));
        assert!(SizeClass::ALL.iter().enumerate().all(|(i, c)| c.index() == i));
    }

    #[test]
    fn test_integral_classification() {
        assert!(FundamentalKind::Bool.is_integral());
        assert!(FundamentalKind::WChar.is_integral());
        assert!(!FundamentalKind::Double.is_integral());
        assert!(FundamentalKind::LongDouble.is_floating());
        assert!(FundamentalKind::UnsignedPointerInt.is_integral());
        assert!(FundamentalKind::PointerInt.is_pointer_width());
        assert!(!FundamentalKind::Long.is_pointer_width());
    }
}
