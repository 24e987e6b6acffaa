use cover_ingest::{IngestError, SheetDescriptor, SheetVariant};
use cover_model::{ColumnRole, LayoutType, LoadScope};

use super::common::{category_column, sheet_cohort, sheet_period};
use super::{KeyPart, KeyParts, LayoutStrategy, SheetScope};
use crate::context::{LoadContext, Matchers};

/// Single-year tables with one row per area and one column per vaccine.
///
/// Serves both the national and the local-area snapshots; they differ only
/// in which areas appear as rows.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotStrategy {
    layout: LayoutType,
}

impl SnapshotStrategy {
    pub fn new(layout: LayoutType) -> Self {
        Self { layout }
    }
}

impl LayoutStrategy for SnapshotStrategy {
    fn layout(&self) -> LayoutType {
        self.layout
    }

    fn row_part(&self) -> KeyPart {
        KeyPart::Area
    }

    fn column_part(&self) -> KeyPart {
        KeyPart::Category
    }

    fn resolve_scope(
        &self,
        descriptor: &SheetDescriptor,
        context: &LoadContext,
        _matchers: &mut Matchers,
    ) -> Result<SheetScope, IngestError> {
        let cohort = sheet_cohort(descriptor, context)?;
        let period = sheet_period(descriptor, context)?;
        Ok(SheetScope {
            scope: LoadScope::new(self.layout)
                .with_cohort(&cohort)
                .with_period(&period),
            fixed: KeyParts::default()
                .with(KeyPart::Cohort, cohort)
                .with(KeyPart::Period, period),
        })
    }

    fn value_column(
        &self,
        header: &str,
        variant: Option<SheetVariant>,
        context: &LoadContext,
        matchers: &mut Matchers,
    ) -> ColumnRole {
        category_column(header, variant, context, matchers)
    }
}
