// Entry point for the CSR corpus tool.
//
// - With no arguments (or `build`) every workbook in the data directory is
//   merged into one CSV corpus, replacing the previous file.
// - `report` loads that corpus and summarises one company's spend by year,
//   sector and state.
mod aggregate;
mod bootstrap;
mod config;
mod corpus;
mod error;
mod naming;
mod output;
mod sheet;
mod types;
mod util;
mod workbook;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use aggregate::YearFilter;
use config::{BuildConfig, Cli, Command, ReportArgs};

/// Build the corpus and write it out, logging what was kept and skipped.
fn handle_build(config: &BuildConfig) -> Result<()> {
    let report = corpus::build_corpus(config)?;
    corpus::write_corpus(&config.output, &report.records)
        .with_context(|| format!("writing {}", config.output.display()))?;

    info!(
        "Included {} workbooks ({} sheets, {} rows)",
        util::format_int(report.companies.len()),
        util::format_int(report.sheets_included),
        util::format_int(report.records.len())
    );
    if !report.skipped_workbooks.is_empty()
        || !report.skipped_sheets.is_empty()
        || report.rejected_rows > 0
    {
        warn!(
            "Skipped {} workbooks, {} sheets, {} rows",
            util::format_int(report.skipped_workbooks.len()),
            util::format_int(report.skipped_sheets.len()),
            util::format_int(report.rejected_rows)
        );
        for sheet in &report.skipped_sheets {
            warn!("  {}/{}: {}", sheet.company, sheet.sheet, sheet.reason);
        }
        for workbook in &report.skipped_workbooks {
            warn!("  {}: {}", workbook.file, workbook.reason);
        }
    }
    info!("All data merged into '{}'", config.output.display());
    Ok(())
}

/// Load the corpus and print one company's dashboard.
fn handle_report(config: &BuildConfig, args: &ReportArgs) -> Result<()> {
    let records = corpus::load_corpus(&config.output)
        .with_context(|| format!("loading {}", config.output.display()))?;
    let companies = aggregate::companies(&records);

    if args.list {
        for company in &companies {
            println!("{}: {}", company, aggregate::years_for(&records, company).join(", "));
        }
        return Ok(());
    }

    let company = match (&args.company, companies.first()) {
        (Some(company), _) => company.clone(),
        (None, Some(first)) => first.clone(),
        (None, None) => bail!("{} holds no records", config.output.display()),
    };
    let years = if args.years.is_empty() {
        YearFilter::All
    } else {
        YearFilter::Only(args.years.iter().cloned().collect())
    };

    let dash = aggregate::aggregate(&records, &company, &years);
    if dash.is_empty() {
        warn!("No rows for {company} in the selected years");
    }

    if args.json {
        println!("{}", output::to_json(&dash)?);
    } else {
        print!("{}", output::render_dashboard(&dash, args.rows));
    }

    if let Some(path) = &args.export {
        let rows: Vec<types::CsrRecord> = aggregate::filter_records(&records, &company, &years)
            .into_iter()
            .cloned()
            .collect();
        corpus::write_corpus(path, &rows)?;
        info!("Exported {} rows to {}", util::format_int(rows.len()), path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    bootstrap::setup_logging(&cli.log_level)?;

    let config = cli.build_config();
    match cli.command.as_ref().unwrap_or(&Command::Build) {
        Command::Build => handle_build(&config),
        Command::Report(args) => handle_report(&config, args),
    }
}
