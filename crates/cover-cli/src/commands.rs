use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use comfy_table::Table;
use cover_cli::summary::{apply_table_style, wide_table, write_csv};
use cover_cli::types::LoadRun;
use cover_core::{LoadContext, ReconstructRequest, default_registry, load_groups, reconstruct};
use cover_ingest::{SheetGroup, list_csv_files, pair_sheets};
use cover_model::WideTable;
use cover_standards::{Standards, load_default_standards, load_standards};
use cover_store::SqliteStore;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, info_span, warn};

use crate::cli::{LoadArgs, ReferenceArgs, ReferenceTableArg, ShowArgs, TableFormatArg};

pub fn run_load(args: &LoadArgs) -> Result<LoadRun> {
    let span = info_span!("load", path = %args.path.display());
    let _guard = span.enter();
    let start = Instant::now();

    let mut standards = open_standards(args.store.standards.as_deref())?;
    if let Some(label) = &args.period {
        let Some(period) = standards.reference.period(label) else {
            bail!("unknown period '{label}'");
        };
        standards.settings.load.default_period = Some(period.key.clone());
    }
    let context = LoadContext::from_standards(standards).context("build load context")?;

    let groups = if args.path.is_dir() {
        if args.counts.is_some() {
            bail!("--counts applies to a single sheet, not a directory");
        }
        let files = list_csv_files(&args.path)
            .with_context(|| format!("list sheets in {}", args.path.display()))?;
        pair_sheets(&files)
    } else {
        vec![SheetGroup {
            primary: args.path.clone(),
            companion: args.counts.clone(),
        }]
    };
    if groups.is_empty() {
        warn!(dir = %args.path.display(), "no CSV sheets found");
    }

    let mut store = SqliteStore::open(&args.store.db)
        .with_context(|| format!("open database {}", args.store.db.display()))?;
    let progress = load_progress(groups.len());
    let outcomes = load_groups(&groups, &context, &mut store, |outcome| {
        progress.set_message(outcome.sheet.clone());
        progress.inc(1);
    });
    progress.finish_and_clear();

    let run = LoadRun {
        db: args.store.db.clone(),
        outcomes,
    };
    info!(
        sheets = run.outcomes.len(),
        failed = run.failed(),
        duration_ms = start.elapsed().as_millis(),
        "load complete"
    );
    Ok(run)
}

pub fn run_show(args: &ShowArgs) -> Result<()> {
    let span = info_span!("show", layout = %args.layout);
    let _guard = span.enter();
    let start = Instant::now();

    let standards = open_standards(args.store.standards.as_deref())?;
    if !args.store.db.exists() {
        bail!(
            "database {} does not exist; run `cover load` first",
            args.store.db.display()
        );
    }
    let store = SqliteStore::open(&args.store.db)
        .with_context(|| format!("open database {}", args.store.db.display()))?;

    let mut request = ReconstructRequest::new(args.layout).with_measure(args.measure.into());
    request.series.clone_from(&args.series);
    request.cohort.clone_from(&args.cohort);
    request.period.clone_from(&args.period);
    request.category.clone_from(&args.category);
    request.areas.clone_from(&args.areas);
    request.categories.clone_from(&args.columns);
    let table = reconstruct(&store, &standards.reference, &request)
        .with_context(|| format!("rebuild {} table", args.layout))?;
    info!(
        rows = table.rows.len(),
        columns = table.columns.len(),
        duration_ms = start.elapsed().as_millis(),
        "table rebuilt"
    );
    print_wide_table(&table, args.format)
}

fn print_wide_table(table: &WideTable, format: TableFormatArg) -> Result<()> {
    match format {
        TableFormatArg::Table => {
            println!("{}", table.title);
            println!("{}", wide_table(table));
        }
        TableFormatArg::Csv => write_csv(table, io::stdout().lock()).context("write csv")?,
        TableFormatArg::Json => {
            let json = serde_json::to_string_pretty(table).context("serialize table")?;
            println!("{json}");
        }
    }
    Ok(())
}

pub fn run_layouts() -> Result<()> {
    let registry = default_registry();
    let mut table = Table::new();
    table.set_header(vec!["Layout", "Rows", "Columns", "Description"]);
    apply_table_style(&mut table);
    for layout in registry.layouts() {
        let Some(strategy) = registry.get(layout) else {
            continue;
        };
        table.add_row(vec![
            layout.to_string(),
            strategy.row_part().to_string(),
            strategy.column_part().to_string(),
            layout.description().to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_reference(args: &ReferenceArgs) -> Result<()> {
    let standards = open_standards(args.standards.as_deref())?;
    let reference = &standards.reference;
    let mut table = Table::new();
    apply_table_style(&mut table);
    match args.table {
        ReferenceTableArg::Areas => {
            table.set_header(vec!["Code", "Name", "Kind", "Parent"]);
            for area in reference.areas() {
                table.add_row(vec![
                    area.code.clone(),
                    area.name.clone(),
                    area.kind.to_string(),
                    area.parent_code.clone().unwrap_or_default(),
                ]);
            }
        }
        ReferenceTableArg::Categories => {
            table.set_header(vec!["Code", "Name", "Aliases", "Description"]);
            for category in reference.categories() {
                let aliases: Vec<&str> = reference
                    .aliases()
                    .iter()
                    .filter(|alias| alias.code == category.code)
                    .map(|alias| alias.alias.as_str())
                    .collect();
                table.add_row(vec![
                    category.code.clone(),
                    category.name.clone(),
                    aliases.join(", "),
                    category.description.clone().unwrap_or_default(),
                ]);
            }
        }
        ReferenceTableArg::Cohorts => {
            table.set_header(vec!["Name", "Age (months)", "Description"]);
            for cohort in reference.cohorts() {
                table.add_row(vec![
                    cohort.name.clone(),
                    cohort.age_months.to_string(),
                    cohort.description.clone().unwrap_or_default(),
                ]);
            }
        }
        ReferenceTableArg::Periods => {
            table.set_header(vec!["Key", "Label", "Start", "End"]);
            for period in reference.periods() {
                table.add_row(vec![
                    period.key.clone(),
                    period.label.clone(),
                    period.start_year.to_string(),
                    period.end_year.to_string(),
                ]);
            }
        }
        ReferenceTableArg::Markers => {
            table.set_header(vec!["Token", "Kind", "Description"]);
            for marker in reference.markers().markers() {
                table.add_row(vec![
                    marker.token.clone(),
                    marker.kind.to_string(),
                    marker.description.clone().unwrap_or_default(),
                ]);
            }
        }
    }
    println!("{table}");
    Ok(())
}

fn open_standards(dir: Option<&Path>) -> Result<Standards> {
    match dir {
        Some(dir) => load_standards(dir)
            .with_context(|| format!("load standards from {}", dir.display())),
        None => load_default_standards().context("load standards"),
    }
}

fn load_progress(len: usize) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}
