use cover_ingest::{IngestError, SheetDescriptor, SheetVariant};
use cover_model::{ColumnRole, LayoutType, LoadScope, ValueColumn};
use cover_transform::{measure_hint, strip_note_references};

use super::common::{measure_for, sheet_cohort, subject_category};
use super::{KeyPart, KeyParts, LayoutStrategy, SheetScope};
use crate::context::{LoadContext, Matchers};

/// Time series for one vaccine with the regions as columns.
///
/// The axes are transposed relative to the other layouts: column headers
/// are matched against area names and the vaccine comes from the sheet
/// name.
#[derive(Debug, Clone, Copy)]
pub struct RegionalStrategy;

impl LayoutStrategy for RegionalStrategy {
    fn layout(&self) -> LayoutType {
        LayoutType::HistoricalByRegionColumns
    }

    fn row_part(&self) -> KeyPart {
        KeyPart::Period
    }

    fn column_part(&self) -> KeyPart {
        KeyPart::Area
    }

    fn resolve_scope(
        &self,
        descriptor: &SheetDescriptor,
        context: &LoadContext,
        matchers: &mut Matchers,
    ) -> Result<SheetScope, IngestError> {
        let cohort = sheet_cohort(descriptor, context)?;
        let category = subject_category(descriptor, matchers)?;
        Ok(SheetScope {
            scope: LoadScope::new(LayoutType::HistoricalByRegionColumns)
                .with_cohort(&cohort)
                .with_category(&category),
            fixed: KeyParts::default()
                .with(KeyPart::Cohort, cohort)
                .with(KeyPart::Category, category),
        })
    }

    fn value_column(
        &self,
        header: &str,
        variant: Option<SheetVariant>,
        _context: &LoadContext,
        matchers: &mut Matchers,
    ) -> ColumnRole {
        let label = strip_note_references(header);
        match matchers.regions.match_label(&label).code {
            Some(code) => ColumnRole::Value(ValueColumn {
                target: code,
                measure: measure_for(measure_hint(header), variant),
                label: header.to_string(),
            }),
            None => ColumnRole::Unmatched {
                label: header.to_string(),
            },
        }
    }
}
