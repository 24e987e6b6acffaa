//! Sheet discovery and pairing of percentage and count sheets.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::classify::{SheetVariant, TableToken, table_token};
use crate::error::{IngestError, Result};
use crate::sheet::sheet_name;

/// CSV sheets directly inside `dir`, ordered by file name.
///
/// Subdirectories are not searched, and a directory whose name ends in
/// `.csv` is not a sheet.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_error = |source: io::Error| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    };
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) if error.kind() == io::ErrorKind::NotFound || !dir.is_dir() => {
            return Err(IngestError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }
        Err(error) => return Err(read_error(error)),
    };

    let mut sheets: Vec<PathBuf> = entries
        .map(|entry| entry.map(|entry| entry.path()).map_err(read_error))
        .filter(|path| path.as_ref().map_or(true, |path| is_csv_sheet(path)))
        .collect::<Result<_>>()?;
    sheets.sort_unstable_by(|left, right| left.file_name().cmp(&right.file_name()));
    Ok(sheets)
}

fn is_csv_sheet(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("csv"))
}

/// One load unit: a primary sheet and, for paired tables, its counts sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetGroup {
    pub primary: PathBuf,
    pub companion: Option<PathBuf>,
}

impl SheetGroup {
    pub fn single(primary: PathBuf) -> Self {
        Self {
            primary,
            companion: None,
        }
    }
}

/// Pairs `a` (percentage) and `b` (count) sheets of the same table.
///
/// A lone `b` sheet becomes a primary on its own. Files whose names carry
/// no table number are returned as single groups so that classification
/// reports them. Groups are ordered by table number, then by name.
pub fn pair_sheets(paths: &[PathBuf]) -> Vec<SheetGroup> {
    let mut tables: BTreeMap<(u32, String), (Option<PathBuf>, Option<PathBuf>)> = BTreeMap::new();
    let mut unnumbered = Vec::new();
    for path in paths {
        let name = sheet_name(path);
        match table_token(&name) {
            Some(token) => {
                let key = (token.table, pairing_suffix(&token));
                let slot = tables.entry(key).or_default();
                match token.variant {
                    Some(SheetVariant::Counts) => slot.1 = Some(path.clone()),
                    _ => slot.0 = Some(path.clone()),
                }
            }
            None => unnumbered.push(SheetGroup::single(path.clone())),
        }
    }

    let mut groups: Vec<SheetGroup> = tables
        .into_values()
        .filter_map(|(primary, companion)| match (primary, companion) {
            (Some(primary), companion) => Some(SheetGroup { primary, companion }),
            (None, Some(counts)) => Some(SheetGroup::single(counts)),
            (None, None) => None,
        })
        .collect();
    groups.extend(unnumbered);
    groups
}

/// Name with the `a`/`b` variant letter removed, so `T4a_UTLA12m` and
/// `T4b_UTLA12m` share a key while `T4a_UTLA12m_2023-to-2024` does not.
/// Text before the table token is part of the key.
fn pairing_suffix(token: &TableToken<'_>) -> String {
    format!("{}/{}", token.prefix, token.rest).to_lowercase()
}
