// Mon Oct 19 2026 - Alex

use crate::abi::AbiProfile;
use crate::layout::{LayoutResult, StorageNote};
use serde::Serialize;
use std::fmt;

pub const PADDING_ROW: &str = "<padding>";
pub const VPTR_ROW: &str = "<vptr>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    VtablePointer,
    Base,
    VirtualBase,
    Member,
    Bitfield,
    Padding,
}

impl RowKind {
    /// Tie-break for rows sharing an offset: slots, then subobjects, then data.
    fn rank(self) -> u8 {
        match self {
            Self::VtablePointer => 0,
            Self::Base | Self::VirtualBase => 1,
            Self::Member | Self::Bitfield => 2,
            Self::Padding => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::VtablePointer => "vptr",
            Self::Base => "base",
            Self::VirtualBase => "virtual base",
            Self::Member => "member",
            Self::Bitfield => "bit-field",
            Self::Padding => "padding",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub name: String,
    pub offset: u64,
    pub size: u64,
    pub kind: RowKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Bit range for bit-fields, owning class for vtable pointers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ReportRow {
    pub fn is_padding(&self) -> bool {
        self.kind == RowKind::Padding
    }

    pub fn end_offset(&self) -> u64 {
        self.offset + self.size
    }
}

/// What a renderer shows for one query: totals plus an offset-ordered table
/// in which padding already appears as explicit rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutReport {
    pub type_name: String,
    pub size: u64,
    pub alignment: u64,
    pub profile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub polymorphic: bool,
    pub rows: Vec<ReportRow>,
}

impl LayoutReport {
    pub fn new(type_name: &str, layout: &LayoutResult, profile: &AbiProfile, description: Option<&str>) -> Self {
        let mut rows = Vec::with_capacity(
            layout.fields.len() + layout.bases.len() + layout.vtable_pointers.len() + layout.padding.len(),
        );

        rows.extend(layout.vtable_pointers.iter().map(|vp| ReportRow {
            name: VPTR_ROW.to_string(),
            offset: vp.offset,
            size: profile.vtable_pointer_size(),
            kind: RowKind::VtablePointer,
            type_name: None,
            note: Some(vp.owner.clone()),
        }));
        rows.extend(layout.bases.iter().map(|base| ReportRow {
            name: base.name.clone(),
            offset: base.offset,
            size: base.size,
            kind: if base.is_virtual { RowKind::VirtualBase } else { RowKind::Base },
            type_name: None,
            note: None,
        }));
        rows.extend(layout.fields.iter().map(|field| {
            let (kind, note) = match field.storage {
                StorageNote::Plain => (RowKind::Member, None),
                note @ StorageNote::Bitfield { .. } => (RowKind::Bitfield, Some(note.to_string())),
            };
            ReportRow {
                name: field.name.clone(),
                offset: field.offset,
                size: field.size,
                kind,
                type_name: Some(field.type_name.clone()),
                note,
            }
        }));
        rows.extend(layout.padding.iter().map(|pad| ReportRow {
            name: PADDING_ROW.to_string(),
            offset: pad.offset,
            size: pad.size,
            kind: RowKind::Padding,
            type_name: None,
            note: None,
        }));
        rows.sort_by_key(|row| (row.offset, row.kind.rank()));

        Self {
            type_name: type_name.to_string(),
            size: layout.size,
            alignment: layout.alignment.as_u64(),
            profile: profile.name().to_string(),
            description: description.map(str::to_string),
            polymorphic: layout.is_polymorphic(),
            rows,
        }
    }

    pub fn row(&self, name: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|row| row.name == name)
    }

    pub fn padding_bytes(&self) -> u64 {
        self.rows.iter().filter(|row| row.is_padding()).map(|row| row.size).sum()
    }

    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }
}

impl fmt::Display for LayoutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}]: size {}, align {}", self.type_name, self.profile, self.size, self.alignment)?;
        if let Some(description) = &self.description {
            writeln!(f, "  {}", description)?;
        }
        for row in &self.rows {
            write!(f, "  {:>6}  {:>4}  {}", row.offset, row.size, row.name)?;
            if let Some(ty) = &row.type_name {
                write!(f, ": {}", ty)?;
            }
            if let Some(note) = &row.note {
                write!(f, " ({})", note)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
