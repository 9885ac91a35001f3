use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::naming::CompanyNameParser;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUTPUT: &str = "merged_csr_data.csv";
pub const DEFAULT_MARKER: &str = "_CSR_Report";
pub const DEFAULT_EXTENSION: &str = "xlsx";

// ── BuildConfig ────────────────────────────────────────────────────────────────

/// Where the corpus is read from and written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub data_dir: PathBuf,
    pub output: PathBuf,
    /// Text separating the company name from the rest of the file name.
    pub marker: String,
    /// File-type marker; only files with this extension are considered.
    pub extension: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            output: PathBuf::from(DEFAULT_OUTPUT),
            marker: DEFAULT_MARKER.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl BuildConfig {
    pub fn name_parser(&self) -> CompanyNameParser {
        CompanyNameParser::new(self.marker.clone(), self.extension.clone())
    }
}

// ── CLI ────────────────────────────────────────────────────────────────────────

/// Merge CSR disclosure workbooks and summarise spend
#[derive(Parser, Debug, Clone)]
#[command(name = "csr_report", version)]
pub struct Cli {
    /// Directory holding one workbook per company
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Merged corpus file (written by `build`, read by `report`)
    #[arg(long, global = true, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// File-name marker that follows the company name
    #[arg(long, global = true, default_value = DEFAULT_MARKER)]
    pub marker: String,

    /// Workbook file extension
    #[arg(long, global = true, default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Logging level
    #[arg(long, global = true, default_value = "info", value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Merge every workbook into the corpus file (default)
    Build,
    /// Show KPIs and spend breakdowns for one company
    Report(ReportArgs),
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportArgs {
    /// Company to report on (defaults to the first in alphabetical order)
    #[arg(long)]
    pub company: Option<String>,

    /// Year label to include; repeat for several (defaults to every year)
    #[arg(long = "year")]
    pub years: Vec<String>,

    /// Print the report as JSON instead of tables
    #[arg(long)]
    pub json: bool,

    /// Also write the filtered rows to this CSV file
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// List companies and their years, then exit
    #[arg(long)]
    pub list: bool,

    /// Rows shown per table
    #[arg(long, default_value = "15")]
    pub rows: usize,
}

impl Cli {
    pub fn build_config(&self) -> BuildConfig {
        BuildConfig {
            data_dir: self.data_dir.clone(),
            output: self.output.clone(),
            marker: self.marker.clone(),
            extension: self.extension.clone(),
        }
    }
}
