// Mon Oct 19 2026 - Alex

use crate::abi::{Alignment, FundamentalKind, SizeClass};
use crate::error::LayoutError;
use serde::Serialize;
use std::fmt;

/// Size and alignment of one fundamental size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FundamentalLayout {
    pub size: u64,
    pub align: Alignment,
}

impl FundamentalLayout {
    fn new(size: u64, align: u64) -> Result<Self, LayoutError> {
        let align = Alignment::new(align)?;
        if size == 0 || size % align.as_u64() != 0 {
            return Err(LayoutError::InvalidProfile(format!(
                "size {} is not a non-zero multiple of alignment {}",
                size, align
            )));
        }
        Ok(Self { size, align })
    }

    const fn natural(size: u64) -> Self {
        Self { size, align: Alignment::natural(size) }
    }

    const fn with_align(size: u64, align: u64) -> Self {
        Self { size, align: Alignment::natural(align) }
    }
}

/// Immutable machine model: fundamental sizes, pointer width, vtable slot width.
///
/// Constructed once per target and shared by reference; nothing downstream
/// assumes a particular preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiProfile {
    name: String,
    table: [FundamentalLayout; SizeClass::COUNT],
    pointer_size: u64,
    vtable_pointer_size: u64,
}

/// Content identity of a profile, used as half of the layout cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProfileKey {
    table: [(u64, u64); SizeClass::COUNT],
    pointer_size: u64,
    vtable_pointer_size: u64,
}

impl AbiProfile {
    /// 32-bit Unix-like target (i386 / arm32 System V).
    pub fn ilp32() -> Self {
        Self {
            name: "ilp32".to_string(),
            table: [
                FundamentalLayout::natural(1),
                FundamentalLayout::natural(2),
                FundamentalLayout::natural(4),
                FundamentalLayout::natural(4),
                FundamentalLayout::natural(8),
                FundamentalLayout::natural(4),
                FundamentalLayout::natural(8),
                FundamentalLayout::with_align(12, 4),
                FundamentalLayout::natural(1),
                FundamentalLayout::natural(4),
            ],
            pointer_size: 4,
            vtable_pointer_size: 4,
        }
    }

    /// 64-bit Unix-like target (x86_64 / aarch64 System V).
    pub fn lp64() -> Self {
        Self {
            name: "lp64".to_string(),
            table: [
                FundamentalLayout::natural(1),
                FundamentalLayout::natural(2),
                FundamentalLayout::natural(4),
                FundamentalLayout::natural(8),
                FundamentalLayout::natural(8),
                FundamentalLayout::natural(4),
                FundamentalLayout::natural(8),
                FundamentalLayout::natural(16),
                FundamentalLayout::natural(1),
                FundamentalLayout::natural(4),
            ],
            pointer_size: 8,
            vtable_pointer_size: 8,
        }
    }

    /// 64-bit Windows target: 4-byte `long`, 2-byte `wchar_t`, 8-byte `long double`.
    pub fn llp64() -> Self {
        Self {
            name: "llp64".to_string(),
            table: [
                FundamentalLayout::natural(1),
                FundamentalLayout::natural(2),
                FundamentalLayout::natural(4),
                FundamentalLayout::natural(4),
                FundamentalLayout::natural(8),
                FundamentalLayout::natural(4),
                FundamentalLayout::natural(8),
                FundamentalLayout::natural(8),
                FundamentalLayout::natural(1),
                FundamentalLayout::natural(2),
            ],
            pointer_size: 8,
            vtable_pointer_size: 8,
        }
    }

    /// Look up a preset by name or common target alias.
    pub fn preset(name: &str) -> Result<Self, LayoutError> {
        match name.to_lowercase().as_str() {
            "ilp32" | "x86" | "i386" | "i686" | "arm" | "32" => Ok(Self::ilp32()),
            "lp64" | "x86_64" | "x64" | "amd64" | "aarch64" | "arm64" | "64" => Ok(Self::lp64()),
            "llp64" | "win64" | "windows" => Ok(Self::llp64()),
            other => Err(LayoutError::InvalidProfile(format!("unknown preset `{}`", other))),
        }
    }

    pub fn preset_names() -> &'static [&'static str] {
        &["ilp32", "lp64", "llp64"]
    }

    pub fn builder(base: AbiProfile) -> ProfileBuilder {
        ProfileBuilder::new(base)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout_of(&self, class: SizeClass) -> FundamentalLayout {
        self.table[class.index()]
    }

    /// Integer row the pointer-width kinds borrow: the first of `long`,
    /// `long long`, `int`, `short` as wide as a data pointer.
    pub fn pointer_int_class(&self) -> Option<SizeClass> {
        [SizeClass::Long, SizeClass::LongLong, SizeClass::Int, SizeClass::Short]
            .into_iter()
            .find(|&c| self.layout_of(c).size == self.pointer_size)
    }

    /// Profile row of `kind`. `None` for `void`, and for the pointer-width
    /// kinds when no integer row matches the pointer size.
    pub fn class_of(&self, kind: FundamentalKind) -> Option<SizeClass> {
        if kind.is_pointer_width() {
            return self.pointer_int_class();
        }
        kind.size_class()
    }

    /// `None` for `void`.
    pub fn size_of(&self, kind: FundamentalKind) -> Option<u64> {
        match self.class_of(kind) {
            Some(class) => Some(self.layout_of(class).size),
            None if kind.is_pointer_width() => Some(self.pointer_size),
            None => None,
        }
    }

    pub fn align_of(&self, kind: FundamentalKind) -> Option<Alignment> {
        match self.class_of(kind) {
            Some(class) => Some(self.layout_of(class).align),
            None if kind.is_pointer_width() => Some(self.pointer_align()),
            None => None,
        }
    }

    pub fn pointer_size(&self) -> u64 {
        self.pointer_size
    }

    pub fn pointer_align(&self) -> Alignment {
        Alignment::natural(self.pointer_size)
    }

    pub fn vtable_pointer_size(&self) -> u64 {
        self.vtable_pointer_size
    }

    pub fn is_64_bit(&self) -> bool {
        self.pointer_size == 8
    }

    pub fn rows(&self) -> impl Iterator<Item = (SizeClass, FundamentalLayout)> + '_ {
        SizeClass::ALL.iter().map(move |&c| (c, self.layout_of(c)))
    }

    pub fn key(&self) -> ProfileKey {
        let mut table = [(0u64, 0u64); SizeClass::COUNT];
        for (slot, entry) in table.iter_mut().zip(self.table.iter()) {
            *slot = (entry.size, entry.align.as_u64());
        }
        ProfileKey {
            table,
            pointer_size: self.pointer_size,
            vtable_pointer_size: self.vtable_pointer_size,
        }
    }
}

impl Default for AbiProfile {
    fn default() -> Self {
        Self::lp64()
    }
}

impl fmt::Display for AbiProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "profile {} (pointer {} bytes, vptr {} bytes)", self.name, self.pointer_size, self.vtable_pointer_size)?;
        for (class, layout) in self.rows() {
            writeln!(f, "  {:<12} size {:>2}  align {:>2}", class.spelling(), layout.size, layout.align)?;
        }
        Ok(())
    }
}

/// Derives a custom profile from a preset, validating every override.
pub struct ProfileBuilder {
    profile: AbiProfile,
    overrides: Vec<(SizeClass, u64, u64)>,
    pointer_size: Option<u64>,
}

impl ProfileBuilder {
    pub fn new(base: AbiProfile) -> Self {
        Self {
            profile: base,
            overrides: Vec::new(),
            pointer_size: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.profile.name = name.to_string();
        self
    }

    pub fn with_size_class(mut self, class: SizeClass, size: u64, align: u64) -> Self {
        self.overrides.push((class, size, align));
        self
    }

    /// Sets both the data-pointer and vtable-pointer width.
    pub fn with_pointer_size(mut self, size: u64) -> Self {
        self.pointer_size = Some(size);
        self
    }

    pub fn build(self) -> Result<AbiProfile, LayoutError> {
        let mut profile = self.profile;
        for (class, size, align) in self.overrides {
            profile.table[class.index()] = FundamentalLayout::new(size, align)
                .map_err(|e| LayoutError::InvalidProfile(format!("{}: {}", class, e)))?;
        }
        if let Some(size) = self.pointer_size {
            if size == 0 || !size.is_power_of_two() {
                return Err(LayoutError::InvalidProfile(format!("pointer size {} is not a power of two", size)));
            }
            profile.pointer_size = size;
            profile.vtable_pointer_size = size;
        }
        if !profile.name.ends_with('*') && profile != Self::reference_for(&profile) {
            profile.name.push('*');
        }
        Ok(profile)
    }

    fn reference_for(profile: &AbiProfile) -> AbiProfile {
        AbiProfile::preset(&profile.name).unwrap_or_else(|_| profile.clone())
    }
}
