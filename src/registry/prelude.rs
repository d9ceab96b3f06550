// Mon Oct 19 2026 - Alex

use crate::abi::FundamentalKind;

/// Standard library typedefs recognised without a declaration in the unit.
///
/// They alias fundamental kinds rather than fixed sizes so they follow the
/// active profile. The pointer-width ones (`size_t`, `intptr_t`, ...) always
/// match the profile's pointer size, even where `long` is narrower.
pub const BUILTIN_TYPEDEFS: &[(&str, FundamentalKind)] = &[
    ("int8_t", FundamentalKind::SignedChar),
    ("uint8_t", FundamentalKind::UnsignedChar),
    ("int16_t", FundamentalKind::Short),
    ("uint16_t", FundamentalKind::UnsignedShort),
    ("int32_t", FundamentalKind::Int),
    ("uint32_t", FundamentalKind::UnsignedInt),
    ("int64_t", FundamentalKind::LongLong),
    ("uint64_t", FundamentalKind::UnsignedLongLong),
    ("int_least8_t", FundamentalKind::SignedChar),
    ("uint_least8_t", FundamentalKind::UnsignedChar),
    ("int_least16_t", FundamentalKind::Short),
    ("uint_least16_t", FundamentalKind::UnsignedShort),
    ("int_least32_t", FundamentalKind::Int),
    ("uint_least32_t", FundamentalKind::UnsignedInt),
    ("int_least64_t", FundamentalKind::LongLong),
    ("uint_least64_t", FundamentalKind::UnsignedLongLong),
    ("int_fast8_t", FundamentalKind::SignedChar),
    ("uint_fast8_t", FundamentalKind::UnsignedChar),
    ("int_fast16_t", FundamentalKind::Long),
    ("uint_fast16_t", FundamentalKind::UnsignedLong),
    ("int_fast32_t", FundamentalKind::Long),
    ("uint_fast32_t", FundamentalKind::UnsignedLong),
    ("int_fast64_t", FundamentalKind::LongLong),
    ("uint_fast64_t", FundamentalKind::UnsignedLongLong),
    ("intmax_t", FundamentalKind::LongLong),
    ("uintmax_t", FundamentalKind::UnsignedLongLong),
    ("size_t", FundamentalKind::UnsignedPointerInt),
    ("ssize_t", FundamentalKind::PointerInt),
    ("ptrdiff_t", FundamentalKind::PointerInt),
    ("intptr_t", FundamentalKind::PointerInt),
    ("uintptr_t", FundamentalKind::UnsignedPointerInt),
    ("off_t", FundamentalKind::Long),
    ("time_t", FundamentalKind::Long),
];

pub fn builtin_typedef(name: &str) -> Option<FundamentalKind> {
    BUILTIN_TYPEDEFS.iter().find(|(n, _)| *n == name).map(|(_, kind)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::abi::AbiProfile;
    use crate::layout::LayoutEngine;
    use crate::registry::{ScopeId, TypeRegistry};

    fn size_in(registry: &TypeRegistry, profile: &AbiProfile, name: &str) -> u64 {
        let id = registry.find(ScopeId::GLOBAL, name).unwrap();
        LayoutEngine::new(registry, profile).layout_named(id).unwrap().size
    }

    #[test]
    fn test_lookup() {
        assert_eq!(builtin_typedef("size_t"), Some(FundamentalKind::UnsignedPointerInt));
        assert_eq!(builtin_typedef("uint16_t"), Some(FundamentalKind::UnsignedShort));
        assert_eq!(builtin_typedef("Point"), None);
    }

    #[test]
    fn test_pointer_sized_typedefs_under_llp64() {
        let registry = TypeRegistry::with_prelude();
        let profile = AbiProfile::llp64();
        for name in ["size_t", "ssize_t", "ptrdiff_t", "intptr_t", "uintptr_t"] {
            assert_eq!(size_in(&registry, &profile, name), 8, "{}", name);
        }
        assert_eq!(size_in(&registry, &profile, "off_t"), 4);
        assert_eq!(profile.size_of(FundamentalKind::Long), Some(4));
    }

    #[test]
    fn test_pointer_sized_typedefs_track_every_preset() {
        let registry = TypeRegistry::with_prelude();
        for profile in [AbiProfile::ilp32(), AbiProfile::lp64(), AbiProfile::llp64()] {
            assert_eq!(size_in(&registry, &profile, "intptr_t"), profile.pointer_size(), "{}", profile.name());
            assert_eq!(size_in(&registry, &profile, "size_t"), profile.pointer_size());
        }
    }
}
