//! The load pipeline shared by every layout.
//!
//! classify → resolve scope → locate table → resolve rows → clean cells →
//! assemble and validate records → replace the scope in one transaction.

use std::path::Path;
use std::time::Instant;

use sha2::{Digest, Sha256};
use tracing::{debug, info, info_span, warn};

use cover_ingest::{
    ColumnClassifier, IngestError, LocatedTable, SheetGroup, SheetVariant, classify, key_field,
    list_csv_files, locate, pair_sheets, read_sheet,
};
use cover_model::{
    CleanedValue, ColumnRole, KeyField, LoadReport, MarkerKind, RawSheet, RecordKey, RowError,
    RowErrorKind,
};
use cover_store::{CoverageStore, StoreTransaction};
use cover_transform::{is_blank_like, note_reference, strip_note_references};

use crate::assemble::RecordBuilder;
use crate::context::{LoadContext, Matchers};
use crate::error::LoadError;
use crate::strategy::{KeyPart, LayoutStrategy, SheetScope, StrategyRegistry, default_registry};

/// One load unit: a sheet and, for paired tables, its counts sheet.
#[derive(Debug, Clone)]
pub struct SheetInput {
    pub sheet: RawSheet,
    pub companion: Option<RawSheet>,
}

impl SheetInput {
    pub fn new(sheet: RawSheet) -> Self {
        Self {
            sheet,
            companion: None,
        }
    }

    #[must_use]
    pub fn with_companion(mut self, companion: RawSheet) -> Self {
        self.companion = Some(companion);
        self
    }

    /// Reads the files of a discovered group.
    pub fn read(group: &SheetGroup) -> Result<Self, IngestError> {
        let sheet = read_sheet(&group.primary)?;
        let companion = group.companion.as_deref().map(read_sheet).transpose()?;
        Ok(Self { sheet, companion })
    }

    /// SHA-256 over every cell of both sheets.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for sheet in std::iter::once(&self.sheet).chain(self.companion.as_ref()) {
            hasher.update(sheet.name.as_bytes());
            hasher.update([0x1e]);
            for row in &sheet.rows {
                for cell in row {
                    hasher.update(cell.as_bytes());
                    hasher.update([0x1f]);
                }
                hasher.update([b'\n']);
            }
        }
        hex::encode(hasher.finalize())
    }
}

/// Loads one sheet with the default strategies.
///
/// # Errors
///
/// Structural problems (unclassifiable sheet, no header, unresolved scope)
/// and store failures. Row problems are reported in the returned
/// [`LoadReport`] instead.
pub fn load_sheet<S: CoverageStore>(
    input: &SheetInput,
    context: &LoadContext,
    store: &mut S,
) -> Result<LoadReport, LoadError> {
    load_sheet_with(default_registry(), input, context, store)
}

/// Loads one sheet, replacing its scope in the store.
pub fn load_sheet_with<S: CoverageStore>(
    registry: &StrategyRegistry,
    input: &SheetInput,
    context: &LoadContext,
    store: &mut S,
) -> Result<LoadReport, LoadError> {
    let sheet = &input.sheet;
    let span = info_span!("load_sheet", sheet = %sheet.name);
    let _guard = span.enter();
    let start = Instant::now();

    let descriptor = classify(sheet)?;
    let strategy = registry
        .get(descriptor.layout)
        .ok_or_else(|| IngestError::UnrecognizedLayout {
            sheet: sheet.name.clone(),
        })?;
    let mut matchers = context.matchers();
    let sheet_scope = strategy.resolve_scope(&descriptor, context, &mut matchers)?;
    debug!(scope = %sheet_scope.scope, "resolved scope");

    let mut report = LoadReport::new(&sheet.name, sheet_scope.scope.clone(), input.fingerprint());
    let mut builder = RecordBuilder::new(descriptor.layout, context.settings().load.range_policy)
        .with_series(sheet_scope.scope.series.clone());
    let mut reader = TableReader {
        strategy,
        sheet_scope: &sheet_scope,
        context,
        matchers: &mut matchers,
        builder: &mut builder,
        report: &mut report,
    };
    reader.read(sheet, descriptor.variant)?;

    if let Some(companion) = &input.companion {
        let companion_descriptor = classify(companion)?;
        if companion_descriptor.layout != descriptor.layout {
            return Err(IngestError::ShapeMismatch {
                sheet: companion.name.clone(),
                layout: descriptor.layout,
                reason: format!("it is a {} sheet", companion_descriptor.layout),
            }
            .into());
        }
        let variant = companion_descriptor.variant.or(Some(SheetVariant::Counts));
        reader.read(companion, variant)?;
    }

    let records = builder.finish(context.settings().load.percentage_tolerance, &mut report);
    let categories = matchers.categories.stats();
    let regions = matchers.regions.stats();
    report.match_hits = categories.hits + regions.hits;
    report.match_misses = categories.misses + regions.misses;

    let mut tx = store.begin()?;
    report.deleted = tx.delete_scope(&report.scope)?;
    for record in &records {
        tx.upsert(record)?;
    }
    tx.commit()?;
    report.inserted = records.len();

    info!(
        layout = %report.layout,
        scope = %report.scope,
        inserted = report.inserted,
        deleted = report.deleted,
        skipped = report.skipped,
        cached_labels = matchers.cache_len(),
        duration_ms = start.elapsed().as_millis(),
        "sheet loaded"
    );
    if report.skipped > 0 {
        warn!(skipped = report.skipped, "rows skipped");
        for error in &report.errors {
            debug!(%error, "skipped");
        }
    }
    if !report.unrecognized_markers.is_empty() {
        warn!(markers = ?report.unrecognized_markers, "unrecognized suppression markers");
    }
    Ok(report)
}

/// Outcome of one group in a multi-sheet load.
#[derive(Debug)]
pub struct SheetOutcome {
    pub sheet: String,
    pub result: Result<LoadReport, LoadError>,
}

/// Loads every group independently; a failing group does not stop the
/// others. `on_done` is called after each group.
pub fn load_groups<S, F>(
    groups: &[SheetGroup],
    context: &LoadContext,
    store: &mut S,
    mut on_done: F,
) -> Vec<SheetOutcome>
where
    S: CoverageStore,
    F: FnMut(&SheetOutcome),
{
    let mut outcomes = Vec::with_capacity(groups.len());
    for group in groups {
        let sheet = cover_ingest::sheet_name(&group.primary);
        let result = SheetInput::read(group)
            .map_err(LoadError::from)
            .and_then(|input| load_sheet(&input, context, store));
        if let Err(error) = &result {
            warn!(sheet = %sheet, %error, "sheet not loaded");
        }
        let outcome = SheetOutcome { sheet, result };
        on_done(&outcome);
        outcomes.push(outcome);
    }
    outcomes
}

/// Discovers, pairs and loads every CSV sheet in a directory.
pub fn load_directory<S: CoverageStore>(
    dir: &Path,
    context: &LoadContext,
    store: &mut S,
) -> Result<Vec<SheetOutcome>, IngestError> {
    let files = list_csv_files(dir)?;
    let groups = pair_sheets(&files);
    info!(dir = %dir.display(), files = files.len(), groups = groups.len(), "loading directory");
    Ok(load_groups(&groups, context, store, |_| {}))
}

/// Column classification: identifier headers first, then the strategy.
struct StrategyColumns<'a> {
    strategy: &'a dyn LayoutStrategy,
    variant: Option<SheetVariant>,
    context: &'a LoadContext,
    matchers: &'a mut Matchers,
}

impl ColumnClassifier for StrategyColumns<'_> {
    fn classify_column(&mut self, _index: usize, header: &str) -> ColumnRole {
        match key_field(header) {
            Some(field) => ColumnRole::key(field),
            None => self
                .strategy
                .value_column(header, self.variant, self.context, self.matchers),
        }
    }
}

/// Reads located tables into the record builder.
struct TableReader<'a> {
    strategy: &'a dyn LayoutStrategy,
    sheet_scope: &'a SheetScope,
    context: &'a LoadContext,
    matchers: &'a mut Matchers,
    builder: &'a mut RecordBuilder,
    report: &'a mut LoadReport,
}

impl TableReader<'_> {
    fn read(&mut self, sheet: &RawSheet, variant: Option<SheetVariant>) -> Result<(), IngestError> {
        let mut columns = StrategyColumns {
            strategy: self.strategy,
            variant,
            context: self.context,
            matchers: &mut *self.matchers,
        };
        let located = locate(sheet, &mut columns)?;
        for (idx, role) in located.roles.iter().enumerate() {
            if let ColumnRole::Unmatched { label } = role {
                self.report
                    .skip(RowError::column(idx, RowErrorKind::UnmatchedColumn, label));
            }
        }

        let row_part = self.strategy.row_part();
        let key_columns = row_key_columns(&located, row_part);
        if key_columns.is_empty() {
            return Err(IngestError::MissingKeyColumn {
                sheet: sheet.name.clone(),
                field: if row_part == KeyPart::Period {
                    KeyField::Period
                } else {
                    KeyField::AreaCode
                },
            });
        }
        let note_column = located.key_column(KeyField::Note);
        let denominator_column = located.key_column(KeyField::Denominator);
        let context = self.context;
        let cleaner = context.cleaner();

        for row in located.region.data_rows.clone() {
            if sheet
                .rows
                .get(row)
                .is_none_or(|cells| cells.iter().all(|cell| cell.trim().is_empty()))
            {
                continue;
            }
            let (row_value, label) = match self.resolve_row(sheet, row, row_part, &key_columns) {
                Ok(resolved) => resolved,
                Err(error) => {
                    self.report.skip(error);
                    continue;
                }
            };

            let mut keys: Vec<RecordKey> = Vec::new();
            for (col, column) in located.value_columns() {
                let raw = sheet.cell(row, col);
                let value = cleaner.clean(raw);
                if let CleanedValue::Suppressed {
                    kind: MarkerKind::Unrecognized,
                    token,
                } = &value
                {
                    self.report.unrecognized_markers.insert(token.clone());
                }
                if value.is_missing() {
                    if !is_blank_like(raw) {
                        self.report
                            .skip(RowError::cell(row, col, RowErrorKind::InvalidValue, raw));
                    }
                    continue;
                }
                let Some(key) = self
                    .sheet_scope
                    .fixed
                    .clone()
                    .with(row_part, &row_value)
                    .with(self.strategy.column_part(), &column.target)
                    .into_key()
                else {
                    continue;
                };
                if !self.sheet_scope.scope.contains_key(&key) {
                    self.report
                        .skip(RowError::cell(row, col, RowErrorKind::OutOfScope, raw));
                    continue;
                }
                self.builder
                    .add_cell(key.clone(), row, &label, column.measure, value);
                keys.push(key);
            }

            if let Some(col) = denominator_column
                && let Some(denominator) = cleaner.clean(sheet.cell(row, col)).as_number()
            {
                self.builder.apply_denominator(&keys, denominator);
            }
            let note = note_column
                .map(|col| sheet.cell(row, col))
                .filter(|note| !note.is_empty())
                .map(str::to_string)
                .or_else(|| {
                    key_columns
                        .iter()
                        .find_map(|&col| note_reference(sheet.cell(row, col)))
                });
            if let Some(note) = note {
                self.builder.apply_note(&keys, &note);
            }
        }
        Ok(())
    }

    /// Resolves the row's area or period, returning its key and a label.
    fn resolve_row(
        &self,
        sheet: &RawSheet,
        row: usize,
        part: KeyPart,
        key_columns: &[usize],
    ) -> Result<(String, String), RowError> {
        let reference = self.context.reference();
        let raw = key_columns
            .iter()
            .map(|&col| sheet.cell(row, col))
            .find(|cell| !cell.is_empty())
            .unwrap_or_default();
        if part == KeyPart::Period {
            let text = strip_note_references(raw);
            return reference
                .period(&text)
                .map(|period| (period.key.clone(), period.label.clone()))
                .ok_or_else(|| RowError::row(row, RowErrorKind::UnknownPeriod, raw));
        }
        key_columns
            .iter()
            .map(|&col| strip_note_references(sheet.cell(row, col)))
            .filter(|text| !text.is_empty())
            .find_map(|text| reference.resolve_area(&text))
            .map(|area| (area.code.clone(), area.name.clone()))
            .ok_or_else(|| RowError::row(row, RowErrorKind::UnknownArea, raw))
    }
}

/// Identifier columns for the row axis, most specific first.
fn row_key_columns(located: &LocatedTable, part: KeyPart) -> Vec<usize> {
    let fields: &[KeyField] = if part == KeyPart::Period {
        &[KeyField::Period]
    } else {
        &[KeyField::AreaCode, KeyField::AreaName]
    };
    fields
        .iter()
        .filter_map(|&field| located.key_column(field))
        .collect()
}
