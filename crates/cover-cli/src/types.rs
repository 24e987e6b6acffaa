use std::path::PathBuf;

use cover_core::SheetOutcome;
use cover_model::LoadReport;

/// Result of one `cover load` invocation.
#[derive(Debug)]
pub struct LoadRun {
    pub db: PathBuf,
    pub outcomes: Vec<SheetOutcome>,
}

impl LoadRun {
    pub fn reports(&self) -> impl Iterator<Item = &LoadReport> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.result.is_err())
            .count()
    }

    /// True when any sheet was rejected as a whole. Skipped rows alone do
    /// not count.
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}
