// Mon Oct 19 2026 - Alex

use crate::abi::Alignment;
use crate::layout::result::LayoutResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a base subobject lands and how much it advances the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasePlacement {
    pub offset: u64,
    pub size: u64,
    pub align: Alignment,
}

impl BasePlacement {
    pub fn end(&self) -> Option<u64> {
        self.offset.checked_add(self.size)
    }
}

/// The single pluggable point for vendor-specific base placement.
///
/// The sequential member algorithm never inspects which policy is active.
pub trait BaseLayoutPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_empty_base(&self, base: &LayoutResult) -> bool {
        base.is_empty()
    }

    /// `None` when aligning `cursor` for the base overflows.
    fn place_base(&self, cursor: u64, base: &LayoutResult) -> Option<BasePlacement>;
}

/// Itanium-style baseline: empty bases take no space.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItaniumBaselinePolicy;

impl BaseLayoutPolicy for ItaniumBaselinePolicy {
    fn name(&self) -> &'static str {
        "itanium_baseline"
    }

    fn place_base(&self, cursor: u64, base: &LayoutResult) -> Option<BasePlacement> {
        if self.is_empty_base(base) {
            return Some(BasePlacement { offset: cursor, size: 0, align: Alignment::ONE });
        }
        Some(BasePlacement {
            offset: base.nv_align.align(cursor)?,
            size: base.nv_size,
            align: base.nv_align,
        })
    }
}

/// Every base is placed like a member, an empty base still taking one byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictSequentialPolicy;

impl BaseLayoutPolicy for StrictSequentialPolicy {
    fn name(&self) -> &'static str {
        "strict_sequential"
    }

    fn place_base(&self, cursor: u64, base: &LayoutResult) -> Option<BasePlacement> {
        Some(BasePlacement {
            offset: base.nv_align.align(cursor)?,
            size: base.nv_size.max(1),
            align: base.nv_align,
        })
    }
}

static ITANIUM_BASELINE: ItaniumBaselinePolicy = ItaniumBaselinePolicy;
static STRICT_SEQUENTIAL: StrictSequentialPolicy = StrictSequentialPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    ItaniumBaseline,
    StrictSequential,
}

impl PolicyKind {
    pub fn policy(self) -> &'static dyn BaseLayoutPolicy {
        match self {
            Self::ItaniumBaseline => &ITANIUM_BASELINE,
            Self::StrictSequential => &STRICT_SEQUENTIAL,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().replace('-', "_").as_str() {
            "itanium_baseline" | "itanium" => Some(Self::ItaniumBaseline),
            "strict_sequential" | "strict" => Some(Self::StrictSequential),
            _ => None,
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.policy().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::result::LayoutFlags;

    fn empty_base() -> LayoutResult {
        let mut layout = LayoutResult::scalar(1, Alignment::ONE);
        layout.nv_size = 0;
        layout.flags = LayoutFlags::EMPTY;
        layout
    }

    #[test]
    fn test_itanium_empty_base_takes_no_space() {
        let placement = ItaniumBaselinePolicy.place_base(5, &empty_base()).unwrap();
        assert_eq!(placement, BasePlacement { offset: 5, size: 0, align: Alignment::ONE });
    }

    #[test]
    fn test_strict_empty_base_takes_a_byte() {
        let placement = StrictSequentialPolicy.place_base(5, &empty_base()).unwrap();
        assert_eq!(placement.offset, 5);
        assert_eq!(placement.size, 1);
    }

    #[test]
    fn test_non_empty_base_aligned() {
        let base = LayoutResult::scalar(8, Alignment::natural(8));
        for policy in [PolicyKind::ItaniumBaseline, PolicyKind::StrictSequential] {
            let placement = policy.policy().place_base(5, &base).unwrap();
            assert_eq!((placement.offset, placement.size), (8, 8));
            assert_eq!(placement.end(), Some(16));
        }
    }

    #[test]
    fn test_base_past_address_space_not_placed() {
        let base = LayoutResult::scalar(8, Alignment::natural(8));
        for policy in [PolicyKind::ItaniumBaseline, PolicyKind::StrictSequential] {
            assert_eq!(policy.policy().place_base(u64::MAX - 2, &base), None);
            let placement = policy.policy().place_base(u64::MAX - 7, &base).unwrap();
            assert_eq!(placement.end(), None);
        }
    }

    #[test]
    fn test_policy_kind_names() {
        assert_eq!(PolicyKind::from_name("strict-sequential"), Some(PolicyKind::StrictSequential));
        assert_eq!(PolicyKind::default().to_string(), "itanium_baseline");
        assert_eq!(PolicyKind::from_name("msvc"), None);
    }
}
