use cover_model::{
    CoverageRecord, LayoutType, LoadReport, LoadScope, RecordKey, RowError, RowErrorKind,
    ValidationError,
};

#[test]
fn record_serializes_with_layout_name() {
    let mut record = CoverageRecord::new(
        LayoutType::SnapshotByNation,
        RecordKey::new("E92000001", "MMR1", "24 months", "2024-2025"),
    );
    record.percentage = Some(88.9);
    let json = serde_json::to_value(&record).expect("serialize record");
    assert_eq!(json["layout"], "snapshot_by_nation");
    assert_eq!(json["key"]["area_code"], "E92000001");

    let round: CoverageRecord = serde_json::from_value(json).expect("deserialize record");
    assert_eq!(round, record);
}

#[test]
fn load_report_serializes_errors() {
    let scope = LoadScope::new(LayoutType::SnapshotByLocalArea)
        .with_cohort("12 months")
        .with_period("2024-2025");
    let mut report = LoadReport::new("T4a_UTLA12m", scope, "abc123");
    report.inserted = 10;
    report.skip(RowError::cell(
        7,
        5,
        RowErrorKind::Invalid {
            error: ValidationError::PercentageOutOfRange { value: 140.0 },
        },
        "140",
    ));

    let json = serde_json::to_value(&report).expect("serialize report");
    assert_eq!(json["layout"], "snapshot_by_local_area");
    assert_eq!(json["scope"]["period"], "2024-2025");
    assert_eq!(json["skipped"], 1);
    assert_eq!(json["errors"][0]["row"], 8);
    assert_eq!(json["errors"][0]["kind"]["kind"], "invalid");
    assert_eq!(
        json["errors"][0]["kind"]["error"]["kind"],
        "percentage_out_of_range"
    );
}
