//! CSV import/export of the verdict store
//!
//! Layout, one line per row, cells separated by `,`:
//!
//! ```text
//! ,Alex,Amun
//! bulbasaur,Smash,Undecided
//! ivysaur,Undecided,Pass
//! ```
//!
//! The header starts with an empty cell followed by the character names in
//! roster order. Each following row is one catalog entity in catalog order:
//! its name, then one verdict token per character.
//!
//! No quoting or escaping is performed. A character or entity name containing
//! `,` or a line break produces a file that will not import back correctly.
//!
//! On import the entity-name cell is ignored by default: the verdict key for
//! data row `i` is its catalog position `i + 1` zero-padded to three digits,
//! which is how files written by earlier versions are read. See [`KeyScheme`].

use crate::store::Character;
use crate::{Catalog, CsvError, Result, Verdict, VerdictStore};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How a data row is mapped to the entity id its verdicts are stored under
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyScheme {
    /// Row position: data row `i` → `format!("{:03}", i + 1)`
    #[default]
    Position,
    /// Look up the catalog entity whose name equals the row's first cell
    EntityName,
}

/// How header columns are matched to characters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterPolicy {
    /// Column `k` belongs to the k-th loaded character; counts must match
    #[default]
    Positional,
    /// Rebuild the roster from the header names
    AdoptHeader,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    pub key_scheme: KeyScheme,
    pub roster_policy: RosterPolicy,
}

/// Result of a successful import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub characters: usize,
    pub rows: usize,
    pub entries: usize,
}

/// Parsed file contents before they are applied to a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSheet {
    /// Header names in column order
    pub characters: Vec<String>,
    /// `choices[k]` is the mapping for column `k`
    pub choices: Vec<HashMap<String, Verdict>>,
    pub rows: usize,
}

/// Key used for data row `row_index` (0-based) under [`KeyScheme::Position`]
pub fn position_key(row_index: usize) -> String {
    format!("{:03}", row_index + 1)
}

/// Append `.csv` unless the path already ends with it
pub fn normalize_csv_path(path: &Path) -> PathBuf {
    if path.to_string_lossy().ends_with(".csv") {
        return path.to_path_buf();
    }
    let mut normalized = path.as_os_str().to_owned();
    normalized.push(".csv");
    PathBuf::from(normalized)
}

/// Render the store as CSV text (no trailing newline)
pub fn encode(store: &VerdictStore, catalog: &Catalog) -> String {
    let mut lines = Vec::with_capacity(catalog.len() + 1);
    lines.push(format!(",{}", store.character_names().join(",")));

    for entity in catalog {
        let verdicts: Vec<&str> = store
            .characters()
            .iter()
            .map(|c| c.verdict(&entity.id).as_str())
            .collect();
        lines.push(format!("{},{}", entity.name, verdicts.join(",")));
    }

    lines.join("\n")
}

/// Write the store to `path` (normalized to `.csv`), overwriting any existing file
///
/// Returns the path actually written.
pub fn export_to_file(path: &Path, store: &VerdictStore, catalog: &Catalog) -> Result<PathBuf> {
    let target = normalize_csv_path(path);
    let content = encode(store, catalog);
    std::fs::write(&target, content)?;

    info!(
        path = %target.display(),
        characters = store.len(),
        rows = catalog.len(),
        "Exported verdicts"
    );
    Ok(target)
}

/// Parse CSV text without touching any store
///
/// `expected_columns` enforces the positional roster check; pass `None` to
/// accept whatever the header declares.
pub fn parse(
    text: &str,
    catalog: &Catalog,
    key_scheme: KeyScheme,
    expected_columns: Option<usize>,
) -> std::result::Result<DecodedSheet, CsvError> {
    let text = text.trim_end_matches(|c: char| c == '\n' || c == '\r');
    let mut lines = text.lines();

    let header = lines.next().ok_or(CsvError::MissingHeader)?;
    let (_, mut names) = split_row(header);
    if names == [""] {
        names.clear();
    }
    let columns = names.len();

    if let Some(expected) = expected_columns {
        if expected != columns {
            return Err(CsvError::ColumnCountMismatch {
                expected,
                found: columns,
            });
        }
    }

    let mut choices: Vec<HashMap<String, Verdict>> = vec![HashMap::new(); columns];
    let mut rows = 0;

    for (row_index, line) in lines.enumerate() {
        let line_no = row_index + 2;
        if row_index >= catalog.len() {
            return Err(CsvError::UnexpectedRow {
                line: line_no,
                catalog_len: catalog.len(),
            });
        }

        let (label, mut cells) = split_row(line);
        if columns == 0 && cells == [""] {
            cells.clear();
        }
        if cells.len() != columns {
            return Err(CsvError::RowWidthMismatch {
                line: line_no,
                expected: columns + 1,
                found: cells.len() + 1,
            });
        }

        let key = match key_scheme {
            KeyScheme::Position => position_key(row_index),
            KeyScheme::EntityName => catalog
                .find_by_name(label)
                .map(|e| e.id.clone())
                .ok_or_else(|| CsvError::UnknownEntity {
                    line: line_no,
                    name: label.to_string(),
                })?,
        };

        for (column, token) in cells.into_iter().enumerate() {
            let verdict = token
                .parse::<Verdict>()
                .map_err(|token| CsvError::InvalidVerdictToken {
                    line: line_no,
                    column: column + 2,
                    token,
                })?;
            choices[column].insert(key.clone(), verdict);
        }
        rows += 1;
    }

    debug!(columns, rows, "Parsed CSV");
    Ok(DecodedSheet {
        characters: names.into_iter().map(str::to_string).collect(),
        choices,
        rows,
    })
}

/// Parse `text` and fully replace the store's contents
///
/// All-or-nothing: the store is untouched when any line fails to parse.
pub fn decode_into(
    text: &str,
    catalog: &Catalog,
    store: &mut VerdictStore,
    options: ImportOptions,
) -> Result<ImportSummary> {
    let expected = match options.roster_policy {
        RosterPolicy::Positional => Some(store.len()),
        RosterPolicy::AdoptHeader => None,
    };
    let sheet = parse(text, catalog, options.key_scheme, expected)?;
    let rows = sheet.rows;

    match options.roster_policy {
        RosterPolicy::Positional => store.replace_choices(sheet.choices)?,
        RosterPolicy::AdoptHeader => {
            let mut seen = HashSet::new();
            for name in &sheet.characters {
                if name.trim().is_empty() {
                    return Err(CsvError::InvalidHeader("empty character name".to_string()).into());
                }
                if !seen.insert(name.as_str()) {
                    return Err(
                        CsvError::InvalidHeader(format!("duplicate character '{}'", name)).into(),
                    );
                }
            }
            let roster = sheet
                .characters
                .into_iter()
                .zip(sheet.choices)
                .map(|(name, choices)| Character::with_choices(name, choices))
                .collect();
            store.replace_roster(roster)?;
        }
    }

    Ok(ImportSummary {
        characters: store.len(),
        rows,
        entries: store.entry_count(),
    })
}

/// Read `path` and replace the store's contents from it
pub fn import_from_file(
    path: &Path,
    catalog: &Catalog,
    store: &mut VerdictStore,
    options: ImportOptions,
) -> Result<ImportSummary> {
    let text = std::fs::read_to_string(path)?;
    let summary = decode_into(&text, catalog, store, options).map_err(|e| {
        warn!(path = %path.display(), error = %e, "Import rejected");
        e
    })?;

    info!(
        path = %path.display(),
        characters = summary.characters,
        rows = summary.rows,
        entries = summary.entries,
        "Imported verdicts"
    );
    Ok(summary)
}

/// Whether a dropped file should be treated as an import
pub fn is_csv_path(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".csv")
}

fn split_row(line: &str) -> (&str, Vec<&str>) {
    let mut cells = line.split(',');
    let label = cells.next().unwrap_or_default();
    (label, cells.collect())
}
