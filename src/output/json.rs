// Mon Oct 19 2026 - Alex

use crate::abi::AbiProfile;
use crate::error::LayoutError;
use crate::query::LayoutReport;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsonError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Machine-readable rendering of layout reports and profiles.
pub struct JsonExporter {
    pretty_print: bool,
    include_padding: bool,
}

impl JsonExporter {
    pub fn new() -> Self {
        Self { pretty_print: true, include_padding: true }
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    pub fn with_padding(mut self, include: bool) -> Self {
        self.include_padding = include;
        self
    }

    pub fn report_value(&self, report: &LayoutReport) -> Result<Value, JsonError> {
        let mut value = serde_json::to_value(report)?;
        if !self.include_padding {
            if let Some(Value::Array(rows)) = value.get_mut("rows") {
                rows.retain(|row| row["kind"] != "padding");
            }
        }
        Ok(value)
    }

    /// Failures are entries too: `{ "query", "error": { "kind", "message" } }`.
    pub fn error_value(&self, query: &str, error: &LayoutError) -> Value {
        json!({
            "query": query,
            "error": { "kind": error.kind(), "message": error.to_string() },
        })
    }

    pub fn profile_value(&self, profile: &AbiProfile) -> Value {
        let fundamentals: serde_json::Map<String, Value> = profile
            .rows()
            .map(|(class, layout)| {
                (class.spelling().to_string(), json!({ "size": layout.size, "align": layout.align.as_u64() }))
            })
            .collect();
        json!({
            "name": profile.name(),
            "pointer_size": profile.pointer_size(),
            "vtable_pointer_size": profile.vtable_pointer_size(),
            "fundamentals": fundamentals,
        })
    }

    pub fn serialize_report(&self, report: &LayoutReport) -> Result<String, JsonError> {
        let value = self.report_value(report)?;
        self.render(&value)
    }

    pub fn serialize_results(&self, results: &[(String, Result<LayoutReport, LayoutError>)]) -> Result<String, JsonError> {
        let entries = results
            .iter()
            .map(|(query, result)| match result {
                Ok(report) => self.report_value(report),
                Err(e) => Ok(self.error_value(query, e)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.render(&Value::Array(entries))
    }

    pub fn serialize_profiles(&self, profiles: &[AbiProfile]) -> Result<String, JsonError> {
        let entries: Vec<Value> = profiles.iter().map(|p| self.profile_value(p)).collect();
        self.render(&Value::Array(entries))
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, text: &str, path: P) -> Result<(), JsonError> {
        fs::write(path.as_ref(), text)?;
        Ok(())
    }

    fn render(&self, value: &Value) -> Result<String, JsonError> {
        let text = if self.pretty_print {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::LayoutSession;
    use crate::resolver::{Declarator, RecordDecl, SourceUnit};
    use crate::types::AggregateKind;

    fn session() -> LayoutSession {
        let unit = SourceUnit::new().with(
            RecordDecl::new(AggregateKind::Struct, Some("PaddingExample"))
                .member("a", Declarator::fundamental("char"))
                .member("b", Declarator::fundamental("int"))
                .member("c", Declarator::fundamental("char"))
                .member("d", Declarator::fundamental("short"))
                .member("e", Declarator::fundamental("char"))
                .member("f", Declarator::fundamental("double")),
        );
        LayoutSession::from_unit(&unit).0
    }

    #[test]
    fn test_report_value_and_padding_filter() {
        let report = session().layout_of("PaddingExample", &AbiProfile::lp64()).unwrap();
        let exporter = JsonExporter::new();
        let value = exporter.report_value(&report).unwrap();
        assert_eq!(value["size"], 24);
        assert_eq!(value["alignment"], 8);
        assert_eq!(value["rows"].as_array().unwrap().len(), 9);

        let trimmed = JsonExporter::new().with_padding(false).report_value(&report).unwrap();
        let rows = trimmed["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 6);
        assert!(rows.iter().all(|row| row["kind"] == "member"));
    }

    #[test]
    fn test_results_include_errors() {
        let session = session();
        let profile = AbiProfile::lp64();
        let results = vec![
            ("int".to_string(), session.layout_of("int", &profile)),
            ("Missing".to_string(), session.layout_of("Missing", &profile)),
        ];
        let text = JsonExporter::new().with_pretty_print(false).serialize_results(&results).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["size"], 4);
        assert_eq!(value[1]["query"], "Missing");
        assert_eq!(value[1]["error"]["kind"], "unknown_type");
        assert!(!text.contains('\n'));
    }

    #[test]
    fn test_profile_value() {
        let value = JsonExporter::new().profile_value(&AbiProfile::llp64());
        assert_eq!(value["name"], "llp64");
        assert_eq!(value["pointer_size"], 8);
        assert_eq!(value["fundamentals"]["long"]["size"], 4);
        assert_eq!(value["fundamentals"]["wchar_t"]["size"], 2);
    }
}
