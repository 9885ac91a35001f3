//! Building, persisting and loading the merged corpus.

use std::io::Write;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::config::BuildConfig;
use crate::error::{BuildError, Result, WorkbookError};
use crate::types::{CsrRecord, SOURCE_FIELDS};
use crate::workbook::{merge_workbook, SkippedSheet, WorkbookMerge};

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedWorkbook {
    pub file: String,
    pub reason: String,
}

/// Outcome of one build: the corpus plus what was left out and why.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub records: Vec<CsrRecord>,
    /// Companies that contributed rows, in processing order.
    pub companies: Vec<String>,
    pub sheets_included: usize,
    pub skipped_sheets: Vec<SkippedSheet>,
    pub skipped_workbooks: Vec<SkippedWorkbook>,
    pub rejected_rows: usize,
}

/// Folds per-workbook results into a [`BuildReport`].
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    report: BuildReport,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&mut self, file: &str, outcome: std::result::Result<WorkbookMerge, WorkbookError>) {
        let merge = match outcome {
            Ok(merge) => merge,
            Err(err) => {
                warn!("Skipping {file}: {err}");
                self.skip(file, err.to_string());
                return;
            }
        };

        self.report.skipped_sheets.extend(merge.skipped);
        self.report.rejected_rows += merge.rejected.len();

        if merge.records.is_empty() {
            warn!("{file}: no data rows in any sheet, company {} omitted", merge.company);
            self.skip(file, format!("no data rows for `{}`", merge.company));
            return;
        }

        info!(
            "{file}: {} rows from {} sheets for {}",
            merge.records.len(),
            merge.sheets.len(),
            merge.company
        );
        self.report.sheets_included += merge.sheets.len();
        self.report.records.extend(merge.records);
        self.report.companies.push(merge.company);
    }

    /// Fails with [`BuildError::CorpusEmpty`] when nothing was absorbed.
    pub fn finish(self, data_dir: &Path) -> Result<BuildReport> {
        if self.report.records.is_empty() {
            return Err(BuildError::CorpusEmpty {
                dir: data_dir.to_path_buf(),
                skipped: self.report.skipped_workbooks.len(),
            });
        }
        Ok(self.report)
    }

    fn skip(&mut self, file: &str, reason: String) {
        self.report.skipped_workbooks.push(SkippedWorkbook {
            file: file.to_string(),
            reason,
        });
    }
}

/// Workbook files directly inside `config.data_dir`, sorted by path.
///
/// Office lock files (`~$...`) are ignored.
pub fn discover_workbooks(config: &BuildConfig) -> Result<Vec<PathBuf>> {
    let parser = config.name_parser();
    let mut files = Vec::new();

    for entry in walkdir::WalkDir::new(&config.data_dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| BuildError::DataDir {
            path: config.data_dir.clone(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if name.starts_with("~$") || !parser.matches_extension(name) {
            continue;
        }
        files.push(entry.into_path());
    }

    files.sort();
    Ok(files)
}

/// Merge every workbook under `config.data_dir`.
pub fn build_corpus(config: &BuildConfig) -> Result<BuildReport> {
    let files = discover_workbooks(config)?;
    if files.is_empty() {
        return Err(BuildError::CorpusEmpty {
            dir: config.data_dir.clone(),
            skipped: 0,
        });
    }

    let parser = config.name_parser();
    let mut builder = CorpusBuilder::new();
    for path in &files {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("Processing {file}...");
        let outcome = parser
            .parse(&file)
            .map_err(WorkbookError::from)
            .and_then(|company| merge_workbook(path, &company));
        builder.absorb(&file, outcome);
    }

    builder.finish(&config.data_dir)
}

/// Column names of the persisted artifact, in order.
pub fn corpus_header() -> Vec<&'static str> {
    SOURCE_FIELDS
        .iter()
        .map(|field| field.name)
        .chain(["Year", "Company"])
        .collect()
}

/// Write `records` to `path`, replacing any previous file.
///
/// Rows go to a temporary file next to `path` which is renamed over it only
/// once everything has been flushed, so readers never see a partial file.
pub fn write_corpus(path: &Path, records: &[CsrRecord]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(tmp.as_file_mut());
        wtr.write_record(corpus_header())?;
        for record in records {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
    }
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

pub fn load_corpus(path: &Path) -> Result<Vec<CsrRecord>> {
    let mut rdr = ReaderBuilder::new().from_path(path)?;
    let mut records = Vec::new();
    for result in rdr.deserialize::<CsrRecord>() {
        records.push(result?);
    }
    Ok(records)
}
