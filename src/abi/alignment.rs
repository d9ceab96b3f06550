// Mon Oct 19 2026 - Alex

use crate::error::LayoutError;
use serde::Serialize;
use std::fmt;

/// A power-of-two byte alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Alignment {
    value: u64,
}

impl Alignment {
    pub const ONE: Alignment = Alignment { value: 1 };

    pub fn new(value: u64) -> Result<Self, LayoutError> {
        if value == 0 || !value.is_power_of_two() {
            return Err(LayoutError::InvalidProfile(format!("alignment {} is not a power of two", value)));
        }
        Ok(Self { value })
    }

    /// Caller guarantees `value` is a power of two.
    pub(crate) const fn natural(value: u64) -> Self {
        Self { value }
    }

    pub fn as_u64(&self) -> u64 {
        self.value
    }

    /// Round `offset` up to the next multiple of this alignment.
    /// `None` when the rounded offset does not fit in a `u64`.
    pub fn align(&self, offset: u64) -> Option<u64> {
        offset.checked_add(self.value - 1).map(|v| v & !(self.value - 1))
    }

    pub fn is_aligned(&self, offset: u64) -> bool {
        offset & (self.value - 1) == 0
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}
