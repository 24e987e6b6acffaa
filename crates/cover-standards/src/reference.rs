//! The immutable reference data snapshot.

use std::collections::HashMap;

use cover_model::{
    Alias, AreaKind, Category, Cohort, GeographicArea, MarkerTable, Period, is_area_code,
    normalize_period_label,
};

use crate::error::{Result, StandardsError};

/// Sort key that places nations first, then regions, then local areas
/// grouped under their region and ordered by name.
pub type AreaOrder = (u8, usize, usize, String, usize);

/// Areas, categories, cohorts, periods and markers, validated and indexed.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    areas: Vec<GeographicArea>,
    categories: Vec<Category>,
    aliases: Vec<Alias>,
    cohorts: Vec<Cohort>,
    periods: Vec<Period>,
    markers: MarkerTable,
    area_by_code: HashMap<String, usize>,
    area_by_name: HashMap<String, usize>,
    period_by_key: HashMap<String, usize>,
}

impl ReferenceData {
    /// Builds the snapshot, checking codes are unique and every area has a
    /// parent chain that ends at a nation.
    pub fn new(
        areas: Vec<GeographicArea>,
        mut categories: Vec<Category>,
        aliases: Vec<Alias>,
        cohorts: Vec<Cohort>,
        mut periods: Vec<Period>,
        markers: MarkerTable,
    ) -> Result<Self> {
        let mut area_by_code = HashMap::new();
        let mut area_by_name = HashMap::new();
        for (idx, area) in areas.iter().enumerate() {
            if area_by_code.insert(area.code.clone(), idx).is_some() {
                return Err(StandardsError::Duplicate {
                    entity: "area code",
                    key: area.code.clone(),
                });
            }
            area_by_name.entry(name_key(&area.name)).or_insert(idx);
        }
        for area in &areas {
            check_parent_chain(area, &areas, &area_by_code)?;
        }

        categories.sort_by_key(|category| category.ordinal);
        let mut seen = HashMap::new();
        for category in &categories {
            if seen.insert(category.code.as_str(), ()).is_some() {
                return Err(StandardsError::Duplicate {
                    entity: "category code",
                    key: category.code.clone(),
                });
            }
        }
        for alias in &aliases {
            if !seen.contains_key(alias.code.as_str()) {
                return Err(StandardsError::UnknownAliasTarget {
                    alias: alias.alias.clone(),
                    code: alias.code.clone(),
                });
            }
        }

        let mut cohort_names = HashMap::new();
        for cohort in &cohorts {
            if cohort_names.insert(cohort.name.to_lowercase(), ()).is_some() {
                return Err(StandardsError::Duplicate {
                    entity: "cohort",
                    key: cohort.name.clone(),
                });
            }
        }

        periods.sort_by_key(Period::sort_key);
        let mut period_by_key = HashMap::new();
        for (idx, period) in periods.iter().enumerate() {
            if period_by_key.insert(period.key.clone(), idx).is_some() {
                return Err(StandardsError::Duplicate {
                    entity: "period",
                    key: period.key.clone(),
                });
            }
        }

        Ok(Self {
            areas,
            categories,
            aliases,
            cohorts,
            periods,
            markers,
            area_by_code,
            area_by_name,
            period_by_key,
        })
    }

    pub fn areas(&self) -> &[GeographicArea] {
        &self.areas
    }

    /// Categories in canonical publication order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    pub fn cohorts(&self) -> &[Cohort] {
        &self.cohorts
    }

    /// Periods in chronological order.
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn markers(&self) -> &MarkerTable {
        &self.markers
    }

    pub fn area(&self, code: &str) -> Option<&GeographicArea> {
        self.area_by_code
            .get(code.trim())
            .map(|&idx| &self.areas[idx])
    }

    /// Case- and whitespace-insensitive lookup by published name.
    pub fn area_by_name(&self, name: &str) -> Option<&GeographicArea> {
        self.area_by_name
            .get(&name_key(name))
            .map(|&idx| &self.areas[idx])
    }

    /// Resolves a code when the text looks like one, otherwise a name.
    pub fn resolve_area(&self, text: &str) -> Option<&GeographicArea> {
        if is_area_code(text) {
            self.area(&text.trim().to_uppercase())
        } else {
            self.area_by_name(text)
        }
    }

    pub fn category(&self, code: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.code == code)
    }

    /// Lookup by period key or any accepted label form.
    pub fn period(&self, label: &str) -> Option<&Period> {
        let key = normalize_period_label(label)?;
        self.period_by_key.get(&key).map(|&idx| &self.periods[idx])
    }

    pub fn cohort(&self, name: &str) -> Option<&Cohort> {
        let wanted = name.trim();
        self.cohorts
            .iter()
            .find(|cohort| cohort.name.eq_ignore_ascii_case(wanted))
    }

    pub fn cohort_by_months(&self, months: u32) -> Option<&Cohort> {
        self.cohorts
            .iter()
            .find(|cohort| cohort.age_months == months)
    }

    /// Ordering key used for area rows of reconstructed tables.
    pub fn area_order(&self, code: &str) -> Option<AreaOrder> {
        let idx = *self.area_by_code.get(code)?;
        let area = &self.areas[idx];
        let key = match area.kind {
            AreaKind::Nation => (0, 0, self.depth(area), String::new(), idx),
            AreaKind::Region => (1, idx, 0, String::new(), idx),
            AreaKind::LocalArea => {
                let region = self
                    .ancestors(area)
                    .find(|ancestor| ancestor.kind == AreaKind::Region)
                    .and_then(|region| self.area_by_code.get(&region.code).copied())
                    .unwrap_or(usize::MAX);
                (2, region, 0, area.name.to_lowercase(), idx)
            }
        };
        Some(key)
    }

    fn depth(&self, area: &GeographicArea) -> usize {
        self.ancestors(area).count()
    }

    /// Walks parent links upward, excluding `area` itself.
    pub fn ancestors<'a>(
        &'a self,
        area: &'a GeographicArea,
    ) -> impl Iterator<Item = &'a GeographicArea> + 'a {
        let mut current = area.parent_code.as_deref();
        let mut steps = 0usize;
        std::iter::from_fn(move || {
            steps += 1;
            if steps > self.areas.len() {
                return None;
            }
            let parent = self.area(current?)?;
            current = parent.parent_code.as_deref();
            Some(parent)
        })
    }
}

fn name_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn check_parent_chain(
    area: &GeographicArea,
    areas: &[GeographicArea],
    by_code: &HashMap<String, usize>,
) -> Result<()> {
    let mut current = area;
    for _ in 0..=areas.len() {
        if current.kind == AreaKind::Nation {
            if let Some(parent) = &current.parent_code
                && !by_code.contains_key(parent)
            {
                return Err(StandardsError::UnknownParent {
                    area: current.code.clone(),
                    parent: parent.clone(),
                });
            }
            return Ok(());
        }
        let Some(parent_code) = &current.parent_code else {
            return Err(StandardsError::DanglingArea {
                area: area.code.clone(),
            });
        };
        let Some(&parent_idx) = by_code.get(parent_code) else {
            return Err(StandardsError::UnknownParent {
                area: current.code.clone(),
                parent: parent_code.clone(),
            });
        };
        current = &areas[parent_idx];
    }
    Err(StandardsError::DanglingArea {
        area: area.code.clone(),
    })
}
