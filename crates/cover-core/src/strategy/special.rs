use cover_ingest::{IngestError, SheetDescriptor, SheetVariant};
use cover_model::{ColumnRole, LayoutType, LoadScope, ValueColumn};
use cover_transform::{age_in_months, measure_hint};

use super::common::{measure_for, sheet_period, subject_category};
use super::{KeyPart, KeyParts, LayoutStrategy, SheetScope};
use crate::context::{LoadContext, Matchers};

/// Selective programs (HepB, BCG) by local area.
///
/// Value columns come in cohort groups: "Number aged 12 months eligible",
/// "Number aged 12 months vaccinated" and "Coverage at 12 months (%)" all
/// feed the same 12 month record.
#[derive(Debug, Clone, Copy)]
pub struct SpecialProgramStrategy;

impl LayoutStrategy for SpecialProgramStrategy {
    fn layout(&self) -> LayoutType {
        LayoutType::SpecialProgram
    }

    fn row_part(&self) -> KeyPart {
        KeyPart::Area
    }

    fn column_part(&self) -> KeyPart {
        KeyPart::Cohort
    }

    fn resolve_scope(
        &self,
        descriptor: &SheetDescriptor,
        context: &LoadContext,
        matchers: &mut Matchers,
    ) -> Result<SheetScope, IngestError> {
        let category = subject_category(descriptor, matchers)?;
        let period = sheet_period(descriptor, context)?;
        Ok(SheetScope {
            scope: LoadScope::new(LayoutType::SpecialProgram)
                .with_category(&category)
                .with_period(&period),
            fixed: KeyParts::default()
                .with(KeyPart::Category, category)
                .with(KeyPart::Period, period),
        })
    }

    fn value_column(
        &self,
        header: &str,
        variant: Option<SheetVariant>,
        context: &LoadContext,
        _matchers: &mut Matchers,
    ) -> ColumnRole {
        let cohort = age_in_months(header)
            .and_then(|months| context.reference().cohort_by_months(months));
        match (cohort, measure_hint(header)) {
            (Some(cohort), Some(hint)) => ColumnRole::Value(ValueColumn {
                target: cohort.name.clone(),
                measure: measure_for(Some(hint), variant),
                label: header.to_string(),
            }),
            _ => ColumnRole::Unmatched {
                label: header.to_string(),
            },
        }
    }
}
