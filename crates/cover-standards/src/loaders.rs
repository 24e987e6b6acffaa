use std::path::{Path, PathBuf};

use tracing::debug;

use cover_model::{
    Alias, AreaKind, Category, Cohort, GeographicArea, MarkerKind, MarkerTable, Period,
    SuppressionMarker,
};

use crate::csv_utils::{CsvRow, get_field, get_optional, read_csv_rows, require_columns};
use crate::error::{Result, StandardsError};
use crate::paths::{
    ALIASES_FILE, AREAS_FILE, CATEGORIES_FILE, COHORTS_FILE, MARKERS_FILE, PERIODS_FILE,
    SETTINGS_FILE, standards_root,
};
use crate::reference::ReferenceData;
use crate::settings::{Settings, load_settings};

/// Reference data together with the settings from the same directory.
#[derive(Debug, Clone)]
pub struct Standards {
    pub root: PathBuf,
    pub reference: ReferenceData,
    pub settings: Settings,
}

pub fn load_default_standards() -> Result<Standards> {
    load_standards(&standards_root())
}

pub fn load_standards(root: &Path) -> Result<Standards> {
    let reference = load_reference_data(root)?;
    let settings = load_settings(&root.join(SETTINGS_FILE))?;
    Ok(Standards {
        root: root.to_path_buf(),
        reference,
        settings,
    })
}

pub fn load_reference_data(root: &Path) -> Result<ReferenceData> {
    let areas = load_areas(&root.join(AREAS_FILE))?;
    let categories = load_categories(&root.join(CATEGORIES_FILE))?;
    let aliases = load_aliases(&root.join(ALIASES_FILE))?;
    let cohorts = load_cohorts(&root.join(COHORTS_FILE))?;
    let periods = load_periods(&root.join(PERIODS_FILE))?;
    let markers_path = root.join(MARKERS_FILE);
    let markers = if markers_path.exists() {
        load_markers(&markers_path)?
    } else {
        MarkerTable::default()
    };
    debug!(
        root = %root.display(),
        areas = areas.len(),
        categories = categories.len(),
        aliases = aliases.len(),
        cohorts = cohorts.len(),
        periods = periods.len(),
        markers = markers.len(),
        "loaded reference data"
    );
    ReferenceData::new(areas, categories, aliases, cohorts, periods, markers)
}

fn read_required(path: &Path, columns: &[&str]) -> Result<Vec<CsvRow>> {
    if !path.exists() {
        return Err(StandardsError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        ));
    }
    let rows = read_csv_rows(path)?;
    require_columns(path, &rows, columns)?;
    Ok(rows)
}

fn invalid_row(path: &Path, idx: usize, message: impl Into<String>) -> StandardsError {
    StandardsError::InvalidRow {
        path: path.to_path_buf(),
        // header is line 1
        row: idx + 2,
        message: message.into(),
    }
}

/// `code,name,kind,parent_code`
pub fn load_areas(path: &Path) -> Result<Vec<GeographicArea>> {
    let rows = read_required(path, &["code", "name", "kind"])?;
    let mut areas = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let code = get_field(row, "code").to_uppercase();
        let name = get_field(row, "name");
        if code.is_empty() || name.is_empty() {
            return Err(invalid_row(path, idx, "area code and name are required"));
        }
        let kind = AreaKind::parse(&get_field(row, "kind"))
            .map_err(|error| invalid_row(path, idx, error.to_string()))?;
        let mut area = GeographicArea::new(code, name, kind);
        area.parent_code = get_optional(row, "parent_code").map(|code| code.to_uppercase());
        areas.push(area);
    }
    Ok(areas)
}

/// `code,name,description`; file order is the canonical order.
pub fn load_categories(path: &Path) -> Result<Vec<Category>> {
    let rows = read_required(path, &["code", "name"])?;
    let mut categories = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let code = get_field(row, "code");
        let name = get_field(row, "name");
        if code.is_empty() || name.is_empty() {
            return Err(invalid_row(path, idx, "category code and name are required"));
        }
        let mut category = Category::new(code, name, idx);
        category.description = get_optional(row, "description");
        categories.push(category);
    }
    Ok(categories)
}

/// `alias,code`
pub fn load_aliases(path: &Path) -> Result<Vec<Alias>> {
    let rows = read_required(path, &["alias", "code"])?;
    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            let alias = get_field(row, "alias");
            let code = get_field(row, "code");
            if alias.is_empty() || code.is_empty() {
                return Err(invalid_row(path, idx, "alias and code are required"));
            }
            Ok(Alias::new(alias, code))
        })
        .collect()
}

/// `name,age_months,description`
pub fn load_cohorts(path: &Path) -> Result<Vec<Cohort>> {
    let rows = read_required(path, &["name", "age_months"])?;
    let mut cohorts = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let name = get_field(row, "name");
        let months: u32 = get_field(row, "age_months")
            .parse()
            .map_err(|_| invalid_row(path, idx, "age_months must be a whole number"))?;
        if name.is_empty() {
            return Err(invalid_row(path, idx, "cohort name is required"));
        }
        let mut cohort = Cohort::new(name, months);
        cohort.description = get_optional(row, "description");
        cohorts.push(cohort);
    }
    Ok(cohorts)
}

/// `key,label,start_year,end_year`; the label defaults to "YYYY to YYYY".
pub fn load_periods(path: &Path) -> Result<Vec<Period>> {
    let rows = read_required(path, &["start_year", "end_year"])?;
    let mut periods = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let start: i32 = get_field(row, "start_year")
            .parse()
            .map_err(|_| invalid_row(path, idx, "start_year must be a year"))?;
        let end: i32 = get_field(row, "end_year")
            .parse()
            .map_err(|_| invalid_row(path, idx, "end_year must be a year"))?;
        if end < start {
            return Err(invalid_row(path, idx, "end_year precedes start_year"));
        }
        let mut period = Period::new(start, end);
        if let Some(key) = get_optional(row, "key")
            && key != period.key
        {
            return Err(invalid_row(
                path,
                idx,
                format!("key {key} does not match years {}", period.key),
            ));
        }
        if let Some(label) = get_optional(row, "label") {
            period.label = label;
        }
        periods.push(period);
    }
    Ok(periods)
}

/// `token,kind,description`
pub fn load_markers(path: &Path) -> Result<MarkerTable> {
    let rows = read_required(path, &["token", "kind"])?;
    let mut markers = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let token = get_field(row, "token");
        if token.is_empty() {
            return Err(invalid_row(path, idx, "marker token is required"));
        }
        let kind = MarkerKind::parse(&get_field(row, "kind"))
            .map_err(|error| invalid_row(path, idx, error.to_string()))?;
        let mut marker = SuppressionMarker::new(token, kind);
        marker.description = get_optional(row, "description");
        markers.push(marker);
    }
    Ok(MarkerTable::new(markers))
}
