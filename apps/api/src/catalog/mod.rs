// Assessment catalog: record types, CSV loading, and field normalization.
// The catalog is loaded once at startup and never mutated afterwards.

pub mod fields;
pub mod literal;
pub mod loader;
pub mod urls;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use loader::load_catalog;

/// Yes/No support flag as exposed to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupportFlag {
    Yes,
    #[default]
    No,
}

impl SupportFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportFlag::Yes => "Yes",
            SupportFlag::No => "No",
        }
    }
}

/// One catalog entry. `url` is always absolute once it leaves the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub url: String,
    pub adaptive_support: SupportFlag,
    pub remote_support: SupportFlag,
    pub description: String,
    /// Minutes. `None` means unknown, which is not the same as zero.
    pub duration: Option<u32>,
    /// Never empty.
    pub test_type: Vec<String>,
}

/// Ordered, read-only set of assessment records.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<AssessmentRecord>,
}

impl Catalog {
    pub fn new(records: Vec<AssessmentRecord>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[AssessmentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// How CSV columns are mapped to record fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColumnLayout {
    /// Resolve columns by header name (with aliases).
    #[default]
    Headers,
    /// Legacy fixed indices: 2 url, 3 remote, 4 adaptive, 5 test_type, 6 description, 9 duration.
    Positional,
}

impl FromStr for ColumnLayout {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "headers" | "header" => Ok(Self::Headers),
            "positional" => Ok(Self::Positional),
            other => anyhow::bail!("CATALOG_LAYOUT must be 'headers' or 'positional', got '{other}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_flag_serializes_as_yes_no() {
        assert_eq!(serde_json::to_string(&SupportFlag::Yes).unwrap(), r#""Yes""#);
        assert_eq!(serde_json::to_string(&SupportFlag::No).unwrap(), r#""No""#);
    }

    #[test]
    fn test_record_serializes_unknown_duration_as_null() {
        let record = AssessmentRecord {
            url: "https://www.shl.com/1".to_string(),
            adaptive_support: SupportFlag::No,
            remote_support: SupportFlag::Yes,
            description: String::new(),
            duration: None,
            test_type: vec!["Knowledge & Skills".to_string()],
        };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value["duration"].is_null());
        assert_eq!(value["remote_support"], "Yes");
        assert!(value["test_type"].is_array());
    }

    #[test]
    fn test_column_layout_parses() {
        assert_eq!("positional".parse::<ColumnLayout>().unwrap(), ColumnLayout::Positional);
        assert_eq!("Headers".parse::<ColumnLayout>().unwrap(), ColumnLayout::Headers);
        assert!("by-magic".parse::<ColumnLayout>().is_err());
    }
}
