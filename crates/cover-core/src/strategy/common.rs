//! Scope and column helpers shared by the strategies.

use cover_ingest::{IngestError, SheetDescriptor, SheetVariant};
use cover_model::{ColumnRole, KeyField, Measure, ValueColumn};
use cover_transform::{MeasureHint, measure_hint};
use tracing::debug;

use crate::context::{LoadContext, Matchers};

/// Cohort named by the sheet's `12m` / `5y` token.
pub(super) fn sheet_cohort(
    descriptor: &SheetDescriptor,
    context: &LoadContext,
) -> Result<String, IngestError> {
    let months = descriptor
        .cohort_months
        .ok_or_else(|| IngestError::UnknownCohort {
            sheet: descriptor.name.clone(),
            token: descriptor.name.clone(),
        })?;
    context
        .reference()
        .cohort_by_months(months)
        .map(|cohort| cohort.name.clone())
        .ok_or_else(|| IngestError::UnknownCohort {
            sheet: descriptor.name.clone(),
            token: format!("{months} months"),
        })
}

/// Period embedded in the sheet name, else the configured default.
pub(super) fn sheet_period(
    descriptor: &SheetDescriptor,
    context: &LoadContext,
) -> Result<String, IngestError> {
    let label = descriptor
        .period
        .as_deref()
        .or(context.settings().load.default_period.as_deref())
        .ok_or_else(|| IngestError::MissingPeriod {
            sheet: descriptor.name.clone(),
        })?;
    context
        .reference()
        .period(label)
        .map(|period| period.key.clone())
        .ok_or_else(|| IngestError::UnknownPeriod {
            sheet: descriptor.name.clone(),
            label: label.to_string(),
        })
}

/// Category named by the sheet's subject token.
pub(super) fn subject_category(
    descriptor: &SheetDescriptor,
    matchers: &mut Matchers,
) -> Result<String, IngestError> {
    let subject = descriptor.subject.as_deref().unwrap_or_default();
    matchers
        .categories
        .match_label(subject)
        .code
        .ok_or_else(|| IngestError::UnknownCategory {
            sheet: descriptor.name.clone(),
            token: subject.to_string(),
        })
}

/// Measure implied by header wording, falling back to the sheet variant.
pub(super) fn measure_for(hint: Option<MeasureHint>, variant: Option<SheetVariant>) -> Measure {
    match hint {
        Some(MeasureHint::Eligible) => Measure::Denominator,
        Some(MeasureHint::Vaccinated) => Measure::Numerator,
        Some(MeasureHint::Coverage) => Measure::Percentage,
        None if variant == Some(SheetVariant::Counts) => Measure::Numerator,
        None => Measure::Percentage,
    }
}

/// Value column whose header names a vaccine.
///
/// An "eligible" header with no recognizable vaccine is the row's
/// population.
pub(super) fn category_column(
    header: &str,
    variant: Option<SheetVariant>,
    context: &LoadContext,
    matchers: &mut Matchers,
) -> ColumnRole {
    let hint = measure_hint(header);
    let label = context.headers().category_label(header);
    if !label.is_empty()
        && let Some(code) = matchers.categories.match_label(&label).code
    {
        return ColumnRole::Value(ValueColumn {
            target: code,
            measure: measure_for(hint, variant),
            label: header.to_string(),
        });
    }
    if hint == Some(MeasureHint::Eligible) {
        return ColumnRole::key(KeyField::Denominator);
    }
    debug!(header, label = %label, "no category for column");
    ColumnRole::Unmatched {
        label: header.to_string(),
    }
}
