//! Loads the bundled standards directory.

use std::fs;

use cover_model::{AreaKind, MarkerKind};
use cover_standards::{
    RangePolicy, StandardsError, load_default_standards, load_markers, load_periods,
    load_reference_data,
};

#[test]
fn loads_bundled_reference_data() {
    let standards = load_default_standards().expect("load standards");
    let reference = &standards.reference;

    assert!(reference.areas().len() > 50);
    assert_eq!(reference.area("E92000001").unwrap().kind, AreaKind::Nation);
    assert_eq!(
        reference.area_by_name("westminster").unwrap().parent_code.as_deref(),
        Some("E12000007")
    );

    let codes: Vec<&str> = reference
        .categories()
        .iter()
        .map(|category| category.code.as_str())
        .collect();
    assert_eq!(codes.first(), Some(&"DTaP_IPV_Hib_HepB"));
    assert!(codes.contains(&"MMR1"));
    assert!(codes.contains(&"BCG"));

    assert_eq!(reference.cohort("24 MONTHS").unwrap().age_months, 24);
    assert_eq!(reference.cohort_by_months(60).unwrap().name, "5 years");
    assert_eq!(reference.period("2012/13").unwrap().label, "2012 to 2013");
    assert_eq!(
        reference.markers().lookup("[c]").map(|marker| marker.kind),
        Some(MarkerKind::Confidential)
    );
}

#[test]
fn bundled_settings_are_read() {
    let standards = load_default_standards().expect("load standards");
    assert_eq!(standards.settings.load.default_period.as_deref(), Some("2024-2025"));
    assert_eq!(standards.settings.load.range_policy, RangePolicy::Suppress);
    assert_eq!(standards.settings.matcher.fuzzy_threshold, 0.85);
}

#[test]
fn missing_marker_file_uses_default_table() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("areas.csv"),
        "code,name,kind,parent_code\nE92000001,England,nation,\n",
    )
    .unwrap();
    fs::write(dir.path().join("categories.csv"), "code,name\nMMR1,MMR1\n").unwrap();
    fs::write(dir.path().join("aliases.csv"), "alias,code\nMMR,MMR1\n").unwrap();
    fs::write(dir.path().join("cohorts.csv"), "name,age_months\n24 months,24\n").unwrap();
    fs::write(
        dir.path().join("periods.csv"),
        "start_year,end_year\n2024,2025\n",
    )
    .unwrap();

    let reference = load_reference_data(dir.path()).unwrap();
    assert_eq!(reference.markers().len(), 3);
    assert_eq!(reference.periods()[0].label, "2024 to 2025");
}

#[test]
fn missing_required_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_reference_data(dir.path()),
        Err(StandardsError::Io { .. })
    ));
}

#[test]
fn rejects_bad_rows() {
    let dir = tempfile::tempdir().unwrap();
    let periods = dir.path().join("periods.csv");
    fs::write(&periods, "key,start_year,end_year\n2024-2025,2024,2025\n2020-2021,2021,2022\n")
        .unwrap();
    match load_periods(&periods) {
        Err(StandardsError::InvalidRow { row, .. }) => assert_eq!(row, 3),
        other => panic!("expected invalid row, got {other:?}"),
    }

    let markers = dir.path().join("markers.csv");
    fs::write(&markers, "token,kind\n[q],mysterious\n").unwrap();
    assert!(matches!(
        load_markers(&markers),
        Err(StandardsError::InvalidRow { .. })
    ));
}
