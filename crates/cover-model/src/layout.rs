use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Structural shape of a published sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutType {
    /// One row per nation, one column per category, single period.
    SnapshotByNation,
    /// One row per local area, one column per category, single period.
    SnapshotByLocalArea,
    /// One row per period for a single area, one column per category.
    HistoricalByYear,
    /// One row per period, one column per region, single category.
    HistoricalByRegionColumns,
    /// One row per local area for a single program, columns grouped by cohort.
    SpecialProgram,
}

impl LayoutType {
    pub const ALL: [LayoutType; 5] = [
        LayoutType::SnapshotByNation,
        LayoutType::SnapshotByLocalArea,
        LayoutType::HistoricalByYear,
        LayoutType::HistoricalByRegionColumns,
        LayoutType::SpecialProgram,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SnapshotByNation => "snapshot_by_nation",
            Self::SnapshotByLocalArea => "snapshot_by_local_area",
            Self::HistoricalByYear => "historical_by_year",
            Self::HistoricalByRegionColumns => "historical_by_region_columns",
            Self::SpecialProgram => "special_program",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let normalized = raw.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|layout| layout.as_str() == normalized)
            .ok_or_else(|| ModelError::UnknownLayout(raw.to_string()))
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::SnapshotByNation => "UK and constituent nations for one year",
            Self::SnapshotByLocalArea => "Upper-tier local authorities for one year",
            Self::HistoricalByYear => "England time series, one row per financial year",
            Self::HistoricalByRegionColumns => "Regional time series, regions as columns",
            Self::SpecialProgram => "Selective programs (HepB, BCG) by local authority",
        }
    }

    /// Layouts whose rows are periods rather than areas.
    pub fn is_time_series(self) -> bool {
        matches!(
            self,
            Self::HistoricalByYear | Self::HistoricalByRegionColumns
        )
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_display_form() {
        for layout in LayoutType::ALL {
            assert_eq!(LayoutType::parse(&layout.to_string()).unwrap(), layout);
        }
        assert_eq!(
            LayoutType::parse("Historical-By-Year").unwrap(),
            LayoutType::HistoricalByYear
        );
        assert!(LayoutType::parse("pivot").is_err());
    }
}
