//! Catalog Loader — reads the assessment CSV into a normalized `Catalog`.
//!
//! Columns are resolved by header name (with aliases) and validated up front; the legacy
//! positional layout is available via `ColumnLayout::Positional`. Malformed rows are
//! skipped with a warning. Callers decide what to do when the whole load fails
//! (the service falls back to an empty catalog).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::fields::{classify_flag, parse_duration, parse_test_type};
use crate::catalog::urls::{join_base, looks_like_url, repair_url};
use crate::catalog::{AssessmentRecord, Catalog, ColumnLayout, SupportFlag};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to open catalog '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read catalog CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("catalog is missing required columns: {missing} (found headers: {found})")]
    MissingColumns { missing: String, found: String },

    #[error("positional layout needs at least {expected} columns, found {found}")]
    TooFewColumns { expected: usize, found: usize },
}

/// The six logical fields and the header names accepted for each.
const URL_ALIASES: &[&str] = &[
    "url",
    "link",
    "assessment url",
    "pre packaged job solutions",
    "individual test solutions",
];
const REMOTE_ALIASES: &[&str] = &["remote support", "remote testing", "remote"];
const ADAPTIVE_ALIASES: &[&str] = &["adaptive support", "adaptive irt", "adaptive"];
const TEST_TYPE_ALIASES: &[&str] = &["test type", "test types"];
const DESCRIPTION_ALIASES: &[&str] = &["description"];
const DURATION_ALIASES: &[&str] = &[
    "duration",
    "assessment length",
    "completion time",
    "approximate completion time",
];

/// Legacy positional indices.
const POSITIONAL: ColumnMap = ColumnMap {
    url: 2,
    remote_support: 3,
    adaptive_support: 4,
    test_type: 5,
    description: 6,
    duration: 9,
};

/// Resolved CSV column index for each record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub url: usize,
    pub remote_support: usize,
    pub adaptive_support: usize,
    pub test_type: usize,
    pub description: usize,
    pub duration: usize,
}

/// Loads and normalizes the catalog at `path`.
pub fn load_catalog(
    path: impl AsRef<Path>,
    layout: ColumnLayout,
    base_url: &str,
) -> Result<Catalog, CatalogError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let catalog = load_catalog_from_reader(file, layout, base_url)?;
    info!(
        "Catalog loaded: {} records from {}",
        catalog.len(),
        path.display()
    );
    Ok(catalog)
}

/// Loads and normalizes a catalog from any CSV reader (header row required).
pub fn load_catalog_from_reader<R: Read>(
    reader: R,
    layout: ColumnLayout,
    base_url: &str,
) -> Result<Catalog, CatalogError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = resolve_columns(&headers, layout)?;
    debug!("Catalog columns resolved: {columns:?}");

    let mut rows = Vec::new();
    for (line, row) in rdr.records().enumerate() {
        match row {
            Ok(row) => rows.push(row),
            Err(e) => warn!("Skipping malformed catalog row {}: {e}", line + 2),
        }
    }

    let url_column_is_absolute = rows
        .iter()
        .any(|row| looks_like_url(cell(row, columns.url)));
    debug!("Catalog URL column holds full URLs: {url_column_is_absolute}");

    let mut unrecognized_flags = 0usize;
    let records: Vec<AssessmentRecord> = rows
        .iter()
        .map(|row| {
            let raw_url = cell(row, columns.url);
            let url = if url_column_is_absolute || raw_url.is_empty() {
                repair_url(Some(raw_url), base_url)
            } else {
                repair_url(Some(&join_base(base_url, raw_url)), base_url)
            };

            let mut flag = |idx: usize| {
                let token = cell(row, idx);
                classify_flag(token).unwrap_or_else(|| {
                    unrecognized_flags += 1;
                    SupportFlag::No
                })
            };
            let remote_support = flag(columns.remote_support);
            let adaptive_support = flag(columns.adaptive_support);

            AssessmentRecord {
                url,
                adaptive_support,
                remote_support,
                description: cell(row, columns.description).to_string(),
                duration: parse_duration(cell(row, columns.duration)),
                test_type: parse_test_type(cell(row, columns.test_type)),
            }
        })
        .collect();

    if unrecognized_flags > 0 {
        warn!("{unrecognized_flags} unrecognized support-flag tokens were mapped to \"No\"");
    }
    if let Some(sample) = records.first() {
        debug!("Sample of cleaned catalog data: {sample:?}");
    }

    Ok(Catalog::new(records))
}

/// Maps record fields to column indices for the given layout.
pub fn resolve_columns(
    headers: &StringRecord,
    layout: ColumnLayout,
) -> Result<ColumnMap, CatalogError> {
    match layout {
        ColumnLayout::Positional => {
            let expected = POSITIONAL.duration + 1;
            if headers.len() < expected {
                return Err(CatalogError::TooFewColumns {
                    expected,
                    found: headers.len(),
                });
            }
            Ok(POSITIONAL)
        }
        ColumnLayout::Headers => {
            let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
            let find = |aliases: &[&str]| {
                aliases
                    .iter()
                    .find_map(|alias| normalized.iter().position(|h| h.as_str() == *alias))
            };

            let url = find(URL_ALIASES);
            let remote_support = find(REMOTE_ALIASES);
            let adaptive_support = find(ADAPTIVE_ALIASES);
            let test_type = find(TEST_TYPE_ALIASES);
            let description = find(DESCRIPTION_ALIASES);
            let duration = find(DURATION_ALIASES);

            match (url, remote_support, adaptive_support, test_type, description, duration) {
                (Some(url), Some(remote), Some(adaptive), Some(test_type), Some(desc), Some(dur)) => {
                    Ok(ColumnMap {
                        url,
                        remote_support: remote,
                        adaptive_support: adaptive,
                        test_type,
                        description: desc,
                        duration: dur,
                    })
                }
                _ => {
                    let missing: Vec<&str> = [
                        ("url", url),
                        ("remote_support", remote_support),
                        ("adaptive_support", adaptive_support),
                        ("test_type", test_type),
                        ("description", description),
                        ("duration", duration),
                    ]
                    .into_iter()
                    .filter(|(_, idx)| idx.is_none())
                    .map(|(name, _)| name)
                    .collect();
                    Err(CatalogError::MissingColumns {
                        missing: missing.join(", "),
                        found: headers.iter().collect::<Vec<_>>().join(", "),
                    })
                }
            }
        }
    }
}

/// Lowercases and collapses `_`, `-`, `/` and whitespace runs into single spaces.
fn normalize_header(header: &str) -> String {
    header
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || matches!(c, '_' | '-' | '/'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn cell(row: &StringRecord, idx: usize) -> &str {
    row.get(idx).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const BASE: &str = "https://www.shl.com";

    const HEADER_CSV: &str = "\
name,url,remote_support,adaptive_support,test_type,description,duration
Python (New),/solutions/products/python-new/,T,F,\"['Knowledge & Skills']\",Multi-choice test of Python,Approximate Completion Time in minutes = 11
OPQ32r,1234,F,T,Personality & Behavior,Occupational personality questionnaire,Untimed
";

    fn load(csv: &str, layout: ColumnLayout) -> Result<Catalog, CatalogError> {
        load_catalog_from_reader(csv.as_bytes(), layout, BASE)
    }

    #[test]
    fn test_header_layout_normalizes_records() {
        let catalog = load(HEADER_CSV, ColumnLayout::Headers).unwrap();
        assert_eq!(catalog.len(), 2);

        let python = &catalog.records()[0];
        assert_eq!(python.url, "https://www.shl.com/solutions/products/python-new/");
        assert_eq!(python.remote_support, SupportFlag::Yes);
        assert_eq!(python.adaptive_support, SupportFlag::No);
        assert_eq!(python.test_type, vec!["Knowledge & Skills"]);
        assert_eq!(python.duration, Some(11));

        let opq = &catalog.records()[1];
        assert_eq!(opq.url, "https://www.shl.com/1234");
        assert_eq!(opq.adaptive_support, SupportFlag::Yes);
        assert_eq!(opq.test_type, vec!["Personality & Behavior"]);
        assert_eq!(opq.duration, None);
    }

    #[test]
    fn test_header_aliases_resolve() {
        let headers = StringRecord::from(vec![
            "Pre-packaged Job Solutions",
            "Remote Testing",
            "Adaptive/IRT",
            "Test Type",
            "Description",
            "Assessment Length",
        ]);
        let map = resolve_columns(&headers, ColumnLayout::Headers).unwrap();
        assert_eq!(
            map,
            ColumnMap {
                url: 0,
                remote_support: 1,
                adaptive_support: 2,
                test_type: 3,
                description: 4,
                duration: 5,
            }
        );
    }

    #[test]
    fn test_missing_columns_are_named() {
        let err = load("url,description\nx,y\n", ColumnLayout::Headers).unwrap_err();
        match err {
            CatalogError::MissingColumns { missing, .. } => {
                assert_eq!(missing, "remote_support, adaptive_support, test_type, duration");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_positional_layout_uses_legacy_indices() {
        let csv = "\
c0,c1,c2,c3,c4,c5,c6,c7,c8,c9
0,Verify G+,/view/verify-g/,T,T,\"['Ability & Aptitude', 'Simulations']\",General ability,x,y,36 minutes
";
        let catalog = load(csv, ColumnLayout::Positional).unwrap();
        let record = &catalog.records()[0];
        assert_eq!(record.url, "https://www.shl.com/view/verify-g/");
        assert_eq!(record.remote_support, SupportFlag::Yes);
        assert_eq!(record.adaptive_support, SupportFlag::Yes);
        assert_eq!(record.test_type, vec!["Ability & Aptitude", "Simulations"]);
        assert_eq!(record.description, "General ability");
        assert_eq!(record.duration, Some(36));
    }

    #[test]
    fn test_positional_layout_rejects_narrow_files() {
        let err = load("a,b,c\n1,2,3\n", ColumnLayout::Positional).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::TooFewColumns {
                expected: 10,
                found: 3
            }
        ));
    }

    #[test]
    fn test_absolute_url_column_used_verbatim() {
        let csv = "\
url,remote_support,adaptive_support,test_type,description,duration
https://www.shl.com/view/a/,T,F,A,desc,10
/view/b/,T,F,B,desc,10
,T,F,C,desc,10
";
        let catalog = load(csv, ColumnLayout::Headers).unwrap();
        let urls: Vec<&str> = catalog.records().iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.shl.com/view/a/",
                "https://www.shl.com/view/b/",
                "https://www.shl.com/missing-url",
            ]
        );
    }

    #[test]
    fn test_every_record_has_list_test_type() {
        let csv = "\
url,remote_support,adaptive_support,test_type,description,duration
1,T,F,,desc,
2,T,F,[],desc,
3,T,F,\"['A','B']\",desc,
";
        let catalog = load(csv, ColumnLayout::Headers).unwrap();
        for record in catalog.records() {
            assert!(!record.test_type.is_empty());
        }
        assert_eq!(catalog.records()[2].test_type, vec!["A", "B"]);
    }

    #[test]
    fn test_load_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(HEADER_CSV.as_bytes()).unwrap();

        let catalog = load_catalog(file.path(), ColumnLayout::Headers, BASE).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_missing_file_is_an_error_not_a_panic() {
        let err = load_catalog("/definitely/not/here.csv", ColumnLayout::Headers, BASE).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
