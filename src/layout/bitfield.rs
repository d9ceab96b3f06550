// Mon Oct 19 2026 - Alex

use crate::abi::{Alignment, SizeClass};

/// Storage unit implied by a bit-field's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageUnit {
    pub class: SizeClass,
    pub size: u64,
    pub align: Alignment,
}

impl StorageUnit {
    pub fn bits(&self) -> u32 {
        (self.size * 8) as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitfieldPlacement {
    /// Byte offset of the storage unit holding the field.
    pub unit_offset: u64,
    pub unit_size: u64,
    pub bit_offset: u32,
    /// A new unit was opened for this field.
    pub opened: bool,
}

impl BitfieldPlacement {
    pub fn unit_end(&self) -> Option<u64> {
        self.unit_offset.checked_add(self.unit_size)
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenUnit {
    unit: StorageUnit,
    offset: u64,
    bits_used: u32,
}

/// Packs consecutive bit-fields into storage units.
///
/// A field joins the open unit while its size class matches and the bits
/// still fit; otherwise the unit is closed and a fresh one opened at the
/// next offset aligned for the declared type.
#[derive(Debug, Default)]
pub struct BitfieldPacker {
    open: Option<OpenUnit>,
}

impl BitfieldPacker {
    pub fn new() -> Self {
        Self::default()
    }

    /// `cursor` is the first free byte after everything placed so far.
    /// Caller guarantees `width <= unit.bits()` and `width > 0`.
    /// `None` when a new unit cannot be aligned without overflowing.
    pub fn place(&mut self, cursor: u64, unit: StorageUnit, width: u32) -> Option<BitfieldPlacement> {
        if let Some(open) = self.open.as_mut() {
            if open.unit.class == unit.class && open.bits_used + width <= open.unit.bits() {
                let bit_offset = open.bits_used;
                open.bits_used += width;
                return Some(BitfieldPlacement {
                    unit_offset: open.offset,
                    unit_size: open.unit.size,
                    bit_offset,
                    opened: false,
                });
            }
        }

        let offset = unit.align.align(cursor)?;
        self.open = Some(OpenUnit { unit, offset, bits_used: width });
        Some(BitfieldPlacement {
            unit_offset: offset,
            unit_size: unit.size,
            bit_offset: 0,
            opened: true,
        })
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }
}
