//! Per-layout loader strategies and their registry.
//!
//! Every layout is loaded by the same pipeline. A [`LayoutStrategy`] only
//! says which key part the rows and the value columns carry, how the sheet
//! name resolves to a [`LoadScope`], and how a value header maps to a
//! column role.
//!
//! | Layout | Rows | Value columns | Scope |
//! |--------|------|---------------|-------|
//! | snapshot by nation | area | category | cohort, period |
//! | snapshot by local area | area | category | cohort, period |
//! | historical by year | period | category | cohort |
//! | historical by region columns | period | area | cohort, category |
//! | special program | area | cohort | category, period |

mod common;
mod historical;
mod regional;
mod snapshot;
mod special;

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use cover_ingest::{IngestError, SheetDescriptor, SheetVariant};
use cover_model::{ColumnRole, LayoutType, LoadScope, RecordKey};

use crate::context::{LoadContext, Matchers};

pub use historical::HistoricalStrategy;
pub use regional::RegionalStrategy;
pub use snapshot::SnapshotStrategy;
pub use special::SpecialProgramStrategy;

/// One component of a record's natural key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPart {
    Area,
    Category,
    Cohort,
    Period,
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Area => "area",
            Self::Category => "category",
            Self::Cohort => "cohort",
            Self::Period => "period",
        })
    }
}

impl KeyPart {
    /// The component of `key` this part names.
    pub fn of(self, key: &RecordKey) -> &str {
        match self {
            Self::Area => &key.area_code,
            Self::Category => &key.category_code,
            Self::Cohort => &key.cohort,
            Self::Period => &key.period,
        }
    }
}

/// Partially known record key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyParts {
    pub area: Option<String>,
    pub category: Option<String>,
    pub cohort: Option<String>,
    pub period: Option<String>,
}

impl KeyParts {
    pub fn set(&mut self, part: KeyPart, value: impl Into<String>) {
        let value = Some(value.into());
        match part {
            KeyPart::Area => self.area = value,
            KeyPart::Category => self.category = value,
            KeyPart::Cohort => self.cohort = value,
            KeyPart::Period => self.period = value,
        }
    }

    #[must_use]
    pub fn with(mut self, part: KeyPart, value: impl Into<String>) -> Self {
        self.set(part, value);
        self
    }

    /// The full key, or `None` while any part is unknown.
    pub fn into_key(self) -> Option<RecordKey> {
        Some(RecordKey::new(
            self.area?,
            self.category?,
            self.cohort?,
            self.period?,
        ))
    }
}

/// What the sheet name resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetScope {
    /// Records this sheet replaces.
    pub scope: LoadScope,
    /// Key parts shared by every record of the sheet.
    pub fixed: KeyParts,
}

/// Layout-specific decisions of the load pipeline.
pub trait LayoutStrategy: Send + Sync {
    fn layout(&self) -> LayoutType;

    fn description(&self) -> &'static str {
        self.layout().description()
    }

    /// Key part identified by each data row.
    fn row_part(&self) -> KeyPart;

    /// Key part identified by each value column.
    fn column_part(&self) -> KeyPart;

    /// Resolves the sheet-level key parts and the replacement scope.
    ///
    /// # Errors
    ///
    /// Returns a structural error when the cohort, period, category or area
    /// the sheet is about cannot be resolved.
    fn resolve_scope(
        &self,
        descriptor: &SheetDescriptor,
        context: &LoadContext,
        matchers: &mut Matchers,
    ) -> Result<SheetScope, IngestError>;

    /// Role of a column whose header is not an identifier header.
    fn value_column(
        &self,
        header: &str,
        variant: Option<SheetVariant>,
        context: &LoadContext,
        matchers: &mut Matchers,
    ) -> ColumnRole;
}

/// Strategies indexed by layout.
pub struct StrategyRegistry {
    strategies: HashMap<LayoutType, Box<dyn LayoutStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Registers a strategy for its layout, replacing any previous one.
    pub fn register(&mut self, strategy: Box<dyn LayoutStrategy>) {
        self.strategies.insert(strategy.layout(), strategy);
    }

    pub fn get(&self, layout: LayoutType) -> Option<&dyn LayoutStrategy> {
        self.strategies.get(&layout).map(Box::as_ref)
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Registered layouts in declaration order.
    pub fn layouts(&self) -> impl Iterator<Item = LayoutType> + '_ {
        LayoutType::ALL
            .into_iter()
            .filter(|layout| self.strategies.contains_key(layout))
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(SnapshotStrategy::new(LayoutType::SnapshotByNation)));
        registry.register(Box::new(SnapshotStrategy::new(
            LayoutType::SnapshotByLocalArea,
        )));
        registry.register(Box::new(HistoricalStrategy));
        registry.register(Box::new(RegionalStrategy));
        registry.register(Box::new(SpecialProgramStrategy));
        registry
    }
}

static DEFAULT_REGISTRY: OnceLock<StrategyRegistry> = OnceLock::new();

/// Registry with a strategy for every layout, built on first use.
pub fn default_registry() -> &'static StrategyRegistry {
    DEFAULT_REGISTRY.get_or_init(StrategyRegistry::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_layout_has_a_strategy() {
        let registry = default_registry();
        assert_eq!(registry.len(), LayoutType::ALL.len());
        for layout in LayoutType::ALL {
            let strategy = registry.get(layout).unwrap();
            assert_eq!(strategy.layout(), layout);
            assert_ne!(strategy.row_part(), strategy.column_part());
        }
        assert_eq!(
            registry.layouts().collect::<Vec<_>>(),
            LayoutType::ALL.to_vec()
        );
    }

    #[test]
    fn rows_are_periods_exactly_for_time_series() {
        for layout in LayoutType::ALL {
            let strategy = default_registry().get(layout).unwrap();
            assert_eq!(
                strategy.row_part() == KeyPart::Period,
                layout.is_time_series(),
                "{layout}"
            );
        }
    }

    #[test]
    fn key_parts_complete_only_when_all_set() {
        let parts = KeyParts::default()
            .with(KeyPart::Area, "E09000033")
            .with(KeyPart::Category, "MMR1")
            .with(KeyPart::Cohort, "24 months");
        assert_eq!(parts.clone().into_key(), None);
        let key = parts.with(KeyPart::Period, "2024-2025").into_key().unwrap();
        assert_eq!(key.period, "2024-2025");
    }
}
