// Mon Oct 19 2026 - Alex

use crate::abi::Alignment;
use crate::types::TypeId;
use bitflags::bitflags;
use std::fmt;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LayoutFlags: u8 {
        /// Declares or inherits a virtual function.
        const POLYMORPHIC = 1 << 0;
        /// Polymorphic or has a virtual base somewhere in its hierarchy.
        const DYNAMIC = 1 << 1;
        /// No data, no vtable pointer, only empty bases.
        const EMPTY = 1 << 2;
        const HAS_BITFIELDS = 1 << 3;
        const HAS_VIRTUAL_BASES = 1 << 4;
        const UNION = 1 << 5;
    }
}

/// How a field occupies its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageNote {
    Plain,
    /// Packed into a storage unit of `unit_size` bytes starting at the field offset.
    Bitfield { unit_size: u64, bit_offset: u32, bit_width: u32 },
}

impl StorageNote {
    pub fn is_bitfield(&self) -> bool {
        matches!(self, Self::Bitfield { .. })
    }
}

impl fmt::Display for StorageNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => Ok(()),
            Self::Bitfield { bit_offset, bit_width, .. } => {
                write!(f, "bits {}..{}", bit_offset, bit_offset + bit_width)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    pub name: String,
    pub type_name: String,
    pub offset: u64,
    pub size: u64,
    pub alignment: Alignment,
    pub storage: StorageNote,
}

impl FieldLayout {
    pub fn end_offset(&self) -> u64 {
        self.offset + self.size
    }
}

/// A base-class subobject placed inside a derived object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseSubobject {
    pub name: String,
    pub offset: u64,
    /// Bytes the subobject occupies; zero for an empty base under the empty-base rule.
    pub size: u64,
    pub is_virtual: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VtablePointer {
    pub offset: u64,
    /// Class that introduced the slot.
    pub owner: String,
    /// Lives inside a virtual-base subobject rather than the non-virtual part.
    pub in_virtual_base: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaddingRegion {
    pub offset: u64,
    pub size: u64,
}

impl PaddingRegion {
    pub fn end(&self) -> u64 {
        self.offset + self.size
    }
}

/// Size, alignment and placement table of one type under one profile.
///
/// Never mutated once built; the cache hands out shared `Arc`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutResult {
    pub size: u64,
    pub alignment: Alignment,
    /// Size and alignment used when this type is a base subobject.
    pub nv_size: u64,
    pub nv_align: Alignment,
    pub fields: Vec<FieldLayout>,
    pub bases: Vec<BaseSubobject>,
    pub vtable_pointers: Vec<VtablePointer>,
    pub padding: Vec<PaddingRegion>,
    /// Every virtual base of the hierarchy, each once, in placement order.
    pub virtual_bases: Vec<TypeId>,
    pub flags: LayoutFlags,
}

impl LayoutResult {
    /// Layout of a type with no inner structure (fundamental, pointer, enum, array).
    pub fn scalar(size: u64, alignment: Alignment) -> Self {
        Self {
            size,
            alignment,
            nv_size: size,
            nv_align: alignment,
            fields: Vec::new(),
            bases: Vec::new(),
            vtable_pointers: Vec::new(),
            padding: Vec::new(),
            virtual_bases: Vec::new(),
            flags: LayoutFlags::empty(),
        }
    }

    pub fn is_polymorphic(&self) -> bool {
        self.flags.contains(LayoutFlags::POLYMORPHIC)
    }

    pub fn is_dynamic(&self) -> bool {
        self.flags.contains(LayoutFlags::DYNAMIC)
    }

    pub fn is_empty(&self) -> bool {
        self.flags.contains(LayoutFlags::EMPTY)
    }

    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn base(&self, name: &str) -> Option<&BaseSubobject> {
        self.bases.iter().find(|b| b.name == name)
    }

    pub fn padding_bytes(&self) -> u64 {
        self.padding.iter().map(|p| p.size).sum()
    }

    /// Slots that belong to the non-virtual part, i.e. move with a base subobject.
    pub fn non_virtual_vtable_pointers(&self) -> impl Iterator<Item = &VtablePointer> {
        self.vtable_pointers.iter().filter(|v| !v.in_virtual_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar() {
        let layout = LayoutResult::scalar(8, Alignment::natural(8));
        assert_eq!(layout.nv_size, 8);
        assert!(layout.fields.is_empty());
        assert!(!layout.is_polymorphic());
        assert_eq!(layout.padding_bytes(), 0);
    }

    #[test]
    fn test_storage_note_display() {
        let note = StorageNote::Bitfield { unit_size: 4, bit_offset: 3, bit_width: 5 };
        assert_eq!(note.to_string(), "bits 3..8");
        assert!(note.is_bitfield());
        assert!(!StorageNote::Plain.is_bitfield());
    }
}
