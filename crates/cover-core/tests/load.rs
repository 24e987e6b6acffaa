//! Loading published sheet shapes end to end into a store.

use cover_core::{LoadContext, LoadError, SheetInput, load_directory, load_sheet};
use cover_ingest::{IngestError, parse_sheet};
use cover_model::{CoverageRecord, LayoutType, LoadScope, ModelError, RecordKey, RowErrorKind};
use cover_standards::load_default_standards;
use cover_store::{
    CoverageStore, MemoryStore, MemoryTransaction, RecordFilter, SqliteStore, StoreError,
    StoreTransaction,
};

fn context() -> LoadContext {
    LoadContext::from_standards(load_default_standards().unwrap()).unwrap()
}

fn input(name: &str, text: &str) -> SheetInput {
    SheetInput::new(parse_sheet(name, text).unwrap())
}

const T4A_HEADER: &str = "Code,Local authority,Region name,ODS upper tier code,Number aged 12 months,\
Coverage at 12 months DTaP/IPV/Hib/HepB (%),Coverage at 12 months MenB (%),\
Coverage at 12 months Rotavirus (%)\n";

const LONDON_ROW: &str = "E12000007,London [note 4],,,\"95,000\",86.2,84.0,80.1\n";
const CITY_ROW: &str = "E09000001,City of London,London,720,6,[c],[c],[c]\n";
const CAMDEN_ROW: &str = "E09000007,Camden,London,72A,\"2,100\",88.0,87.5,85\n";
const WESTMINSTER_ROW: &str = "E09000033,Westminster,London,713,\"2,500\",78.5,77.0,75.2\n";

fn t4a(rows: &[&str]) -> SheetInput {
    let mut text = String::from(
        "\"Table 4a: Coverage at 12 months by local authority, England, 2024 to 2025\"\n\
         This worksheet contains one table.\n",
    );
    text.push_str(T4A_HEADER);
    for row in rows {
        text.push_str(row);
    }
    text.push_str("Source: COVER programme\n");
    input("T4a_UTLA12m", &text)
}

fn t4b() -> cover_model::RawSheet {
    parse_sheet(
        "T4b_UTLA12m",
        "\"Table 4b: Number vaccinated at 12 months by local authority, England\"\n\
         Code,Local authority,Region name,ODS upper tier code,Number aged 12 months,\
         Number aged 12 months vaccinated with DTaP/IPV/Hib/HepB,\
         Number aged 12 months vaccinated with MenB\n\
         E09000001,City of London,London,720,6,[c],[c]\n\
         E09000007,Camden,London,72A,\"2,100\",\"1,848\",\"1,838\"\n\
         E09000033,Westminster,London,713,\"2,500\",\"1,963\",\"1,925\"\n",
    )
    .unwrap()
}

fn key(area: &str, category: &str) -> RecordKey {
    RecordKey::new(area, category, "12 months", "2024-2025")
}

fn find<'a>(
    records: &'a [CoverageRecord],
    area: &str,
    category: &str,
) -> Option<&'a CoverageRecord> {
    records.iter().find(|record| record.key == key(area, category))
}

fn snapshot_records<S: CoverageStore>(store: &S) -> Vec<CoverageRecord> {
    store
        .query(&RecordFilter::for_layout(LayoutType::SnapshotByLocalArea))
        .unwrap()
}

#[test]
fn local_area_sheet_loads_every_cell() {
    let context = context();
    let mut store = MemoryStore::new();
    let report = load_sheet(
        &t4a(&[LONDON_ROW, CITY_ROW, CAMDEN_ROW, WESTMINSTER_ROW]),
        &context,
        &mut store,
    )
    .unwrap();

    assert_eq!(report.layout, LayoutType::SnapshotByLocalArea);
    assert_eq!(
        report.scope,
        LoadScope::new(LayoutType::SnapshotByLocalArea)
            .with_cohort("12 months")
            .with_period("2024-2025")
    );
    assert_eq!(report.inserted, 12);
    assert_eq!(report.deleted, 0);
    assert_eq!(report.skipped, 0, "{:?}", report.errors);
    assert_eq!(report.fingerprint.len(), 64);

    let records = snapshot_records(&store);
    let westminster = find(&records, "E09000033", "DTaP_IPV_Hib_HepB").unwrap();
    assert_eq!(westminster.percentage, Some(78.5));
    assert_eq!(westminster.denominator, Some(2500.0));
    assert_eq!(westminster.numerator, None);
    assert!(!westminster.suppressed);

    let rota = find(&records, "E09000007", "Rota").unwrap();
    assert_eq!(rota.percentage, Some(85.0));

    let london = find(&records, "E12000007", "MenB").unwrap();
    assert_eq!(london.note.as_deref(), Some("[note 4]"));
}

#[test]
fn percentage_only_sheet_keeps_counts_empty() {
    let context = context();
    let mut store = MemoryStore::new();
    let report = load_sheet(
        &input(
            "T4a_UTLA12m",
            "Code,Local authority,Coverage at 12 months DTaP/IPV/Hib/HepB (%)\n\
             E09000033,Westminster,78.5%\n",
        ),
        &context,
        &mut store,
    )
    .unwrap();

    assert_eq!(report.inserted, 1);
    assert_eq!(report.skipped, 0, "{:?}", report.errors);
    let records = snapshot_records(&store);
    let westminster = find(&records, "E09000033", "DTaP_IPV_Hib_HepB").unwrap();
    assert_eq!(westminster.percentage, Some(78.5));
    assert_eq!(westminster.numerator, None);
    assert_eq!(westminster.denominator, None);
    assert!(!westminster.suppressed);
}

#[test]
fn suppressed_cells_keep_their_token() {
    let context = context();
    let mut store = MemoryStore::new();
    load_sheet(&t4a(&[CITY_ROW, CAMDEN_ROW]), &context, &mut store).unwrap();

    let records = snapshot_records(&store);
    let city = find(&records, "E09000001", "MenB").unwrap();
    assert!(city.suppressed);
    assert!(city.confidential);
    assert_eq!(city.display_token.as_deref(), Some("[c]"));
    assert_eq!(city.percentage, None);
    assert_eq!(city.denominator, None);
}

#[test]
fn reload_replaces_the_whole_scope() {
    let context = context();
    let mut store = MemoryStore::new();
    load_sheet(
        &t4a(&[CITY_ROW, CAMDEN_ROW, WESTMINSTER_ROW]),
        &context,
        &mut store,
    )
    .unwrap();

    let report = load_sheet(&t4a(&[CITY_ROW, WESTMINSTER_ROW]), &context, &mut store).unwrap();
    assert_eq!(report.deleted, 9);
    assert_eq!(report.inserted, 6);

    let records = snapshot_records(&store);
    assert_eq!(records.len(), 6);
    assert!(records.iter().all(|record| record.key.area_code != "E09000007"));
}

#[test]
fn loading_the_same_sheet_twice_changes_nothing() {
    let context = context();
    let mut store = SqliteStore::open_in_memory().unwrap();
    let sheet = t4a(&[LONDON_ROW, CITY_ROW, CAMDEN_ROW, WESTMINSTER_ROW]);

    let first = load_sheet(&sheet, &context, &mut store).unwrap();
    let before = snapshot_records(&store);
    let second = load_sheet(&sheet, &context, &mut store).unwrap();

    assert_eq!(snapshot_records(&store), before);
    assert_eq!(second.deleted, first.inserted);
    assert_eq!(second.inserted, first.inserted);
    assert_eq!(second.fingerprint, first.fingerprint);
}

#[test]
fn other_scopes_are_untouched() {
    let context = context();
    let mut store = MemoryStore::new();
    load_sheet(&t4a(&[CAMDEN_ROW]), &context, &mut store).unwrap();

    let t5a = input(
        "T5a_UTLA24m",
        "Code,Local authority,Coverage at 24 months MMR1 (%),Coverage at 24 months Hib/MenC (%)\n\
         E09000007,Camden,81.0,80.2\n\
         E09000033,Westminster,70.4,71.9\n",
    );
    let report = load_sheet(&t5a, &context, &mut store).unwrap();
    assert_eq!(report.deleted, 0);
    assert_eq!(report.inserted, 4);

    load_sheet(&t4a(&[WESTMINSTER_ROW]), &context, &mut store).unwrap();
    let cohorts: Vec<String> = snapshot_records(&store)
        .into_iter()
        .filter(|record| record.key.area_code == "E09000007")
        .map(|record| record.key.cohort)
        .collect();
    assert_eq!(cohorts, ["24 months", "24 months"]);
}

#[test]
fn counts_sheet_completes_the_percentages() {
    let context = context();
    let mut store = MemoryStore::new();
    let sheet = t4a(&[CITY_ROW, CAMDEN_ROW, WESTMINSTER_ROW]).with_companion(t4b());
    let report = load_sheet(&sheet, &context, &mut store).unwrap();
    assert_eq!(report.skipped, 0, "{:?}", report.errors);

    let records = snapshot_records(&store);
    let westminster = find(&records, "E09000033", "DTaP_IPV_Hib_HepB").unwrap();
    assert_eq!(westminster.numerator, Some(1963.0));
    assert_eq!(westminster.denominator, Some(2500.0));
    assert_eq!(westminster.percentage, Some(78.5));

    let camden = find(&records, "E09000007", "MenB").unwrap();
    assert_eq!(camden.numerator, Some(1838.0));

    // Rotavirus is only published as a percentage.
    let rota = find(&records, "E09000033", "Rota").unwrap();
    assert_eq!(rota.numerator, None);

    let city = find(&records, "E09000001", "DTaP_IPV_Hib_HepB").unwrap();
    assert!(city.suppressed);
    assert_eq!(city.numerator, None);
}

#[test]
fn bad_rows_and_cells_are_reported_not_fatal() {
    let context = context();
    let mut store = MemoryStore::new();
    let report = load_sheet(
        &t4a(&[
            "E09999999,Atlantis,London,000,100,50,50,50\n",
            "E09000007,Camden,London,72A,\"2,100\",104.2,[w],twelve\n",
            WESTMINSTER_ROW,
        ]),
        &context,
        &mut store,
    )
    .unwrap();

    assert_eq!(report.inserted, 4);
    let kinds: Vec<&str> = report.errors.iter().map(|error| error.kind_label()).collect();
    assert!(kinds.contains(&"unknown area"), "{kinds:?}");
    assert!(kinds.contains(&"invalid value"), "{kinds:?}");
    assert!(kinds.contains(&"validation"), "{kinds:?}");
    assert_eq!(report.skipped, report.errors.len());
    assert!(report.unrecognized_markers.contains("[w]"));

    let unknown = report
        .errors
        .iter()
        .find(|error| error.kind == RowErrorKind::UnknownArea)
        .unwrap();
    assert_eq!(unknown.row, Some(4));

    let records = snapshot_records(&store);
    let marker = find(&records, "E09000007", "MenB").unwrap();
    assert!(marker.suppressed);
    assert!(!marker.confidential);
    assert!(find(&records, "E09000007", "DTaP_IPV_Hib_HepB").is_none());
}

#[test]
fn unmatched_columns_are_skipped() {
    let context = context();
    let mut store = MemoryStore::new();
    let report = load_sheet(
        &input(
            "T1_UK12m",
            "Geographic area,Code,Number aged 12 months,Coverage at 12 months MMR1 (%),Coverage at 12 months Smallpox (%)\n\
             England,E92000001,\"590,000\",89.4,12.0\n\
             Wales,W92000004,\"30,000\",92.1,10.0\n",
        ),
        &context,
        &mut store,
    )
    .unwrap();
    assert_eq!(report.inserted, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.errors[0].kind, RowErrorKind::UnmatchedColumn);
    assert_eq!(report.errors[0].column, Some(5));
}

#[test]
fn regional_sheet_reads_areas_from_columns() {
    let context = context();
    let mut store = MemoryStore::new();
    let report = load_sheet(
        &input(
            "T14_RegDTaP24m",
            "\"Table 14: DTaP/IPV/Hib/HepB coverage at 24 months by region, 2022 to 2023 to 2024 to 2025\"\n\
             Financial year,Notes,England,North East,London\n\
             2022 to 2023,,92.6,94.1,86.4\n\
             2023 to 2024,[note 5],92.3,93.8,85.9\n\
             2024 to 2025,,92.0,93.5,[x]\n",
        ),
        &context,
        &mut store,
    )
    .unwrap();

    assert_eq!(
        report.scope,
        LoadScope::new(LayoutType::HistoricalByRegionColumns)
            .with_cohort("24 months")
            .with_category("DTaP_IPV_Hib_HepB")
    );
    assert_eq!(report.inserted, 9);

    let records = store
        .query(&RecordFilter::for_layout(LayoutType::HistoricalByRegionColumns))
        .unwrap();
    let north_east = records
        .iter()
        .find(|record| record.key.area_code == "E12000001" && record.key.period == "2023-2024")
        .unwrap();
    assert_eq!(north_east.percentage, Some(93.8));
    assert_eq!(north_east.note.as_deref(), Some("[note 5]"));
    let london = records
        .iter()
        .find(|record| record.key.area_code == "E12000007" && record.key.period == "2024-2025")
        .unwrap();
    assert!(london.suppressed);
    assert_eq!(london.display_token.as_deref(), Some("[x]"));
}

#[test]
fn historical_sheet_uses_the_national_area() {
    let context = context();
    let mut store = MemoryStore::new();
    let report = load_sheet(
        &input(
            "T10_Eng24m",
            "\"Table 10: Coverage at 24 months, England\"\n\
             Financial year,DTaP/IPV/Hib (%),MMR1 (%),Hib/MenC (%)\n\
             2022 to 2023,93.1,89.3,89.4\n\
             2023 to 2024,92.7,88.9,88.6\n",
        ),
        &context,
        &mut store,
    )
    .unwrap();

    assert_eq!(report.inserted, 6);
    let records = store
        .query(&RecordFilter::for_layout(LayoutType::HistoricalByYear))
        .unwrap();
    assert!(records.iter().all(|record| record.key.area_code == "E92000001"));
    assert!(records.iter().all(|record| record.key.cohort == "24 months"));
}

const T10: &str = "Financial year,DTaP/IPV/Hib (%),MMR1 (%)\n\
2022 to 2023,93.1,89.3\n\
2023 to 2024,92.7,88.9\n";

const T13: &str = "Financial year,MMR1 (%),DTaP/IPV/Hib (%)\n\
2012 to 2013,91.0,\n\
2023 to 2024,89.0,10.0\n";

fn load_in_order(names: &[&str]) -> MemoryStore {
    let context = context();
    let mut store = MemoryStore::new();
    for name in names {
        let text = if name.starts_with("T10") { T10 } else { T13 };
        load_sheet(&input(name, text), &context, &mut store).unwrap();
    }
    store
}

#[test]
fn published_file_names_load() {
    let context = context();
    let mut store = MemoryStore::new();
    let report = load_sheet(
        &input("cover-anual-data-tables-2024-to-2025_T10_Eng24m", T10),
        &context,
        &mut store,
    )
    .unwrap();
    assert_eq!(report.layout, LayoutType::HistoricalByYear);
    assert_eq!(report.inserted, 4);

    let dir = tempfile::tempdir().unwrap();
    let mut t4a_text = String::from(T4A_HEADER);
    t4a_text.push_str(WESTMINSTER_ROW);
    std::fs::write(
        dir.path()
            .join("cover-anual-data-tables-2024-to-2025_T4a_UTLA12m.csv"),
        t4a_text,
    )
    .unwrap();
    std::fs::write(
        dir.path()
            .join("cover-anual-data-tables-2024-to-2025_T4b_UTLA12m.csv"),
        "Code,Local authority,Number aged 12 months,\
         Number aged 12 months vaccinated with DTaP/IPV/Hib/HepB\n\
         E09000033,Westminster,\"2,500\",\"1,963\"\n",
    )
    .unwrap();
    let outcomes = load_directory(dir.path(), &context, &mut store).unwrap();
    assert_eq!(outcomes.len(), 1);
    let report = outcomes[0].result.as_ref().unwrap();
    assert_eq!(report.scope.period.as_deref(), Some("2024-2025"));

    let records = snapshot_records(&store);
    let westminster = find(&records, "E09000033", "DTaP_IPV_Hib_HepB").unwrap();
    assert_eq!(westminster.numerator, Some(1963.0));
}

#[test]
fn vaccine_series_and_all_vaccine_table_load_in_either_order() {
    let forward = load_in_order(&["T10_Eng24m", "T13_EngMMR24m"]);
    let backward = load_in_order(&["T13_EngMMR24m", "T10_Eng24m"]);
    let records = |store: &MemoryStore| store.records().cloned().collect::<Vec<_>>();
    assert_eq!(records(&forward), records(&backward));
    assert_eq!(forward.len().unwrap(), 6);

    let main = forward
        .query(&RecordFilter::for_layout(LayoutType::HistoricalByYear))
        .unwrap();
    let mmr: Vec<(&str, Option<f64>)> = main
        .iter()
        .filter(|record| record.key.category_code == "MMR1")
        .map(|record| (record.key.period.as_str(), record.percentage))
        .collect();
    assert_eq!(mmr, [("2022-2023", Some(89.3)), ("2023-2024", Some(88.9))]);

    let series = forward
        .query(
            &RecordFilter::for_layout(LayoutType::HistoricalByYear)
                .with_series(Some("MMR1".to_string())),
        )
        .unwrap();
    let mmr: Vec<(&str, &str, Option<f64>)> = series
        .iter()
        .map(|record| {
            (
                record.key.category_code.as_str(),
                record.key.period.as_str(),
                record.percentage,
            )
        })
        .collect();
    assert_eq!(
        mmr,
        [("MMR1", "2012-2013", Some(91.0)), ("MMR1", "2023-2024", Some(89.0))]
    );
}

#[test]
fn vaccine_series_reload_leaves_the_all_vaccine_table() {
    let context = context();
    let mut store = load_in_order(&["T10_Eng24m", "T13_EngMMR24m"]);

    let report = load_sheet(&input("T13_EngMMR24m", T13), &context, &mut store).unwrap();
    assert_eq!(
        report.scope,
        LoadScope::new(LayoutType::HistoricalByYear)
            .with_series("MMR1")
            .with_cohort("24 months")
            .with_category("MMR1")
    );
    assert_eq!(report.deleted, 2);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.errors[0].kind, RowErrorKind::OutOfScope);

    let report = load_sheet(&input("T10_Eng24m", T10), &context, &mut store).unwrap();
    assert_eq!(report.deleted, 4);
    assert_eq!(store.len().unwrap(), 6);
}

#[test]
fn special_program_groups_columns_by_cohort() {
    let context = context();
    let mut store = MemoryStore::new();
    let report = load_sheet(
        &input(
            "T7_UTLAHepB",
            "\"Table 7: Neonatal hepatitis B coverage, 2024 to 2025\"\n\
             Code,Local authority,Region,ODS code,Number aged 12 months eligible,\
             Number aged 12 months vaccinated,Coverage at 12 months (%),\
             Number aged 24 months eligible,Number aged 24 months vaccinated,\
             Coverage at 24 months (%)\n\
             E09000007,Camden,London,72A,8,8,100,10,9,90\n\
             E09000033,Westminster,London,713,[c],[c],[c],12,11,91.7\n",
        ),
        &context,
        &mut store,
    )
    .unwrap();

    assert_eq!(
        report.scope,
        LoadScope::new(LayoutType::SpecialProgram)
            .with_category("HepB")
            .with_period("2024-2025")
    );
    assert_eq!(report.inserted, 4);
    assert_eq!(report.skipped, 0, "{:?}", report.errors);

    let records = store
        .query(&RecordFilter::for_layout(LayoutType::SpecialProgram))
        .unwrap();
    let camden = records
        .iter()
        .find(|record| record.key.area_code == "E09000007" && record.key.cohort == "24 months")
        .unwrap();
    assert_eq!(camden.numerator, Some(9.0));
    assert_eq!(camden.denominator, Some(10.0));
    assert_eq!(camden.percentage, Some(90.0));
    let westminster = records
        .iter()
        .find(|record| record.key.area_code == "E09000033" && record.key.cohort == "12 months")
        .unwrap();
    assert!(westminster.suppressed);
    assert_eq!(westminster.numerator, None);
}

#[test]
fn structural_problems_fail_the_sheet() {
    let context = context();
    let mut store = MemoryStore::new();

    let error = load_sheet(&input("Contents", "Table,Title\nT1,Coverage\n"), &context, &mut store)
        .unwrap_err();
    assert!(error.is_structural());

    let error = load_sheet(
        &input("T4a_UTLA12m", "Table 4a\nNo data this year\n"),
        &context,
        &mut store,
    )
    .unwrap_err();
    assert!(matches!(
        error,
        LoadError::Structural(IngestError::NoHeaderDetected { .. })
    ));

    let error = load_sheet(
        &input(
            "T10_Eng24m",
            "Code,Local authority,MMR1 (%)\nE09000007,Camden,81.0\n",
        ),
        &context,
        &mut store,
    )
    .unwrap_err();
    assert!(matches!(
        error,
        LoadError::Structural(IngestError::ShapeMismatch { .. })
    ));
    assert!(store.is_empty().unwrap());
}

/// Memory store whose transactions can be told to fail on write.
struct FailingStore {
    inner: MemoryStore,
    fail_writes: bool,
}

struct FailingTransaction<'a> {
    inner: MemoryTransaction<'a>,
    fail_writes: bool,
}

impl StoreTransaction for FailingTransaction<'_> {
    fn delete_scope(&mut self, scope: &LoadScope) -> cover_store::Result<usize> {
        self.inner.delete_scope(scope)
    }

    fn upsert(&mut self, record: &CoverageRecord) -> cover_store::Result<()> {
        if self.fail_writes {
            return Err(StoreError::Decode(ModelError::UnknownLayout(
                "write refused".to_string(),
            )));
        }
        self.inner.upsert(record)
    }

    fn commit(self) -> cover_store::Result<()> {
        self.inner.commit()
    }
}

impl CoverageStore for FailingStore {
    type Transaction<'a> = FailingTransaction<'a>;

    fn begin(&mut self) -> cover_store::Result<Self::Transaction<'_>> {
        let fail_writes = self.fail_writes;
        Ok(FailingTransaction {
            inner: self.inner.begin()?,
            fail_writes,
        })
    }

    fn query(&self, filter: &RecordFilter) -> cover_store::Result<Vec<CoverageRecord>> {
        self.inner.query(filter)
    }

    fn len(&self) -> cover_store::Result<usize> {
        self.inner.len()
    }
}

#[test]
fn failed_write_leaves_previous_load_in_place() {
    let context = context();
    let mut store = FailingStore {
        inner: MemoryStore::new(),
        fail_writes: false,
    };
    load_sheet(
        &t4a(&[CITY_ROW, CAMDEN_ROW, WESTMINSTER_ROW]),
        &context,
        &mut store,
    )
    .unwrap();
    let before = snapshot_records(&store);

    store.fail_writes = true;
    let error = load_sheet(&t4a(&[WESTMINSTER_ROW]), &context, &mut store).unwrap_err();
    assert!(matches!(error, LoadError::Store(_)));
    assert_eq!(snapshot_records(&store), before);
    assert_eq!(before.len(), 9);
}

#[test]
fn directory_load_isolates_failing_sheets() {
    let dir = tempfile::tempdir().unwrap();
    let mut t4a_text = String::from(T4A_HEADER);
    t4a_text.push_str(CAMDEN_ROW);
    t4a_text.push_str(WESTMINSTER_ROW);
    std::fs::write(dir.path().join("T4a_UTLA12m.csv"), t4a_text).unwrap();
    std::fs::write(dir.path().join("T5a_UTLA24m.csv"), "Table 5a\nNo data\n").unwrap();
    std::fs::write(dir.path().join("Contents.csv"), "Table,Title\nT1,Coverage\n").unwrap();
    std::fs::write(dir.path().join("readme.txt"), "not a sheet").unwrap();

    let context = context();
    let mut store = MemoryStore::new();
    let outcomes = load_directory(dir.path(), &context, &mut store).unwrap();
    assert_eq!(outcomes.len(), 3);

    let outcome = |name: &str| {
        outcomes
            .iter()
            .find(|outcome| outcome.sheet == name)
            .unwrap()
    };
    assert_eq!(outcome("T4a_UTLA12m").result.as_ref().unwrap().inserted, 6);
    assert!(outcome("T5a_UTLA24m").result.is_err());
    assert!(outcome("Contents").result.is_err());
    assert_eq!(store.len().unwrap(), 6);
}

#[test]
fn missing_directory_is_an_error() {
    let context = context();
    let mut store = MemoryStore::new();
    let result = load_directory(std::path::Path::new("/no/such/dir"), &context, &mut store);
    assert!(matches!(result, Err(IngestError::DirectoryNotFound { .. })));
}
