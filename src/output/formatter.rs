// Mon Oct 19 2026 - Alex

use crate::abi::AbiProfile;
use crate::error::LayoutError;
use crate::query::{LayoutReport, ReportRow, RowKind};
use colored::{ColoredString, Colorize};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetFormat {
    Hex,
    #[default]
    Decimal,
}

/// Terminal rendering of layout reports.
pub struct ReportFormatter {
    offset_format: OffsetFormat,
    use_color: bool,
    show_padding: bool,
    show_types: bool,
    max_name_width: usize,
}

impl ReportFormatter {
    pub fn new() -> Self {
        Self {
            offset_format: OffsetFormat::Decimal,
            use_color: true,
            show_padding: true,
            show_types: true,
            max_name_width: 32,
        }
    }

    pub fn with_offset_format(mut self, format: OffsetFormat) -> Self {
        self.offset_format = format;
        self
    }

    pub fn with_color(mut self, enabled: bool) -> Self {
        self.use_color = enabled;
        self
    }

    pub fn with_padding(mut self, show: bool) -> Self {
        self.show_padding = show;
        self
    }

    pub fn with_types(mut self, show: bool) -> Self {
        self.show_types = show;
        self
    }

    pub fn with_max_name_width(mut self, width: usize) -> Self {
        self.max_name_width = width.max(4);
        self
    }

    pub fn format_offset(&self, offset: u64) -> String {
        match self.offset_format {
            OffsetFormat::Hex => format!("0x{:04x}", offset),
            OffsetFormat::Decimal => format!("{}", offset),
        }
    }

    fn paint(&self, text: String, style: fn(&str) -> ColoredString) -> String {
        if self.use_color {
            style(&text).to_string()
        } else {
            text
        }
    }

    fn truncate(&self, name: &str) -> String {
        if name.chars().count() > self.max_name_width {
            let kept: String = name.chars().take(self.max_name_width - 3).collect();
            format!("{}...", kept)
        } else {
            name.to_string()
        }
    }

    pub fn format_row(&self, row: &ReportRow) -> String {
        let offset = format!("/* +{:<6} */", self.format_offset(row.offset));
        let body = match row.kind {
            RowKind::Member | RowKind::Bitfield => match (&row.type_name, self.show_types) {
                (Some(ty), true) => format!("{} {};", ty, self.truncate(&row.name)),
                _ => format!("{};", self.truncate(&row.name)),
            },
            RowKind::Base => format!("{} (base)", self.truncate(&row.name)),
            RowKind::VirtualBase => format!("{} (virtual base)", self.truncate(&row.name)),
            RowKind::VtablePointer | RowKind::Padding => row.name.clone(),
        };
        let mut comment = format!("// {} {}", row.size, if row.size == 1 { "byte" } else { "bytes" });
        if let Some(note) = &row.note {
            comment.push_str(&format!(", {}", note));
        }
        let line = format!("    {} {}  {}", offset, body, comment);
        match row.kind {
            RowKind::Padding => self.paint(line, |s| s.dimmed()),
            RowKind::VtablePointer => self.paint(line, |s| s.magenta()),
            RowKind::Base | RowKind::VirtualBase => self.paint(line, |s| s.cyan()),
            RowKind::Member | RowKind::Bitfield => line,
        }
    }

    pub fn format_report(&self, report: &LayoutReport) -> String {
        let header = format!(
            "{}  // size: {}, align: {} [{}]",
            report.type_name, report.size, report.alignment, report.profile
        );
        let mut lines = vec![self.paint(header, |s| s.bold())];
        if let Some(description) = &report.description {
            lines.push(format!("    // {}", description));
        }
        if report.has_rows() {
            lines.push("{".to_string());
            lines.extend(
                report
                    .rows
                    .iter()
                    .filter(|row| self.show_padding || !row.is_padding())
                    .map(|row| self.format_row(row)),
            );
            lines.push("};".to_string());
            if report.padding_bytes() > 0 {
                lines.push(self.paint(format!("// {} padding bytes", report.padding_bytes()), |s| s.yellow()));
            }
        }
        lines.iter().join("\n")
    }

    /// "size unavailable" line for a failed query.
    pub fn format_error(&self, query: &str, error: &LayoutError) -> String {
        let line = format!("{}: size unavailable: {}", query, error);
        self.paint(line, |s| s.red())
    }

    pub fn format_profile(&self, profile: &AbiProfile) -> String {
        let header = format!(
            "{} (pointer: {}, vtable pointer: {})",
            profile.name(),
            profile.pointer_size(),
            profile.vtable_pointer_size()
        );
        let rows = profile
            .rows()
            .map(|(class, layout)| format!("    {:<12} size {:>2}  align {:>2}", class.spelling(), layout.size, layout.align));
        std::iter::once(self.paint(header, |s| s.bold())).chain(rows).join("\n")
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}
