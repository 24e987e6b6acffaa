use cover_ingest::{IngestError, SheetDescriptor, SheetVariant};
use cover_model::{ColumnRole, LayoutType, LoadScope};
use tracing::debug;

use super::common::{category_column, sheet_cohort, subject_category};
use super::{KeyPart, KeyParts, LayoutStrategy, SheetScope};
use crate::context::{LoadContext, Matchers};

/// Single-area time series: one row per year, one column per vaccine.
///
/// The area comes from `historical_area` in the settings. Sheets whose
/// name carries a vaccine (`T13_EngMMR24m`) are a series of their own: they
/// are stored apart from the all-vaccine tables of the same cohort and only
/// hold that vaccine.
#[derive(Debug, Clone, Copy)]
pub struct HistoricalStrategy;

impl LayoutStrategy for HistoricalStrategy {
    fn layout(&self) -> LayoutType {
        LayoutType::HistoricalByYear
    }

    fn row_part(&self) -> KeyPart {
        KeyPart::Period
    }

    fn column_part(&self) -> KeyPart {
        KeyPart::Category
    }

    fn resolve_scope(
        &self,
        descriptor: &SheetDescriptor,
        context: &LoadContext,
        matchers: &mut Matchers,
    ) -> Result<SheetScope, IngestError> {
        let cohort = sheet_cohort(descriptor, context)?;
        let code = &context.settings().load.historical_area;
        let area = context
            .reference()
            .area(code)
            .ok_or_else(|| IngestError::UnknownArea {
                sheet: descriptor.name.clone(),
                code: code.clone(),
            })?;

        let mut scope = LoadScope::new(LayoutType::HistoricalByYear).with_cohort(&cohort);
        if let Some(subject) = &descriptor.subject {
            match subject_category(descriptor, matchers) {
                Ok(category) => scope = scope.with_series(&category).with_category(category),
                Err(error) => {
                    debug!(%error, "time series subject is not a vaccine");
                    scope = scope.with_series(subject);
                }
            }
        }

        Ok(SheetScope {
            scope,
            fixed: KeyParts::default()
                .with(KeyPart::Area, &area.code)
                .with(KeyPart::Cohort, cohort),
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
