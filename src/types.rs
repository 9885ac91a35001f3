use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One positional column of a disclosure sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Numeric, blank allowed.
    OptionalAmount,
    /// Numeric, must be present.
    Amount,
}

/// The fixed source layout. Source headers are never consulted; cells are
/// bound to these descriptors by position only.
pub const SOURCE_FIELDS: [FieldDescriptor; 8] = [
    FieldDescriptor { name: "SerialNo", kind: FieldKind::Text },
    FieldDescriptor { name: "Project", kind: FieldKind::Text },
    FieldDescriptor { name: "Sector", kind: FieldKind::Text },
    FieldDescriptor { name: "State", kind: FieldKind::Text },
    FieldDescriptor { name: "District", kind: FieldKind::Text },
    FieldDescriptor { name: "BudgetOutlayCr", kind: FieldKind::OptionalAmount },
    FieldDescriptor { name: "AmountSpentCr", kind: FieldKind::Amount },
    FieldDescriptor { name: "ImplementationMode", kind: FieldKind::Text },
];

pub const SOURCE_COLUMNS: usize = SOURCE_FIELDS.len();

/// Canonical corpus row. Field order here is the column order of the
/// persisted artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrRecord {
    #[serde(rename = "SerialNo")]
    pub serial_no: String,
    #[serde(rename = "Project")]
    pub project: String,
    #[serde(rename = "Sector")]
    pub sector: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "District")]
    pub district: String,
    #[serde(rename = "BudgetOutlayCr")]
    pub budget_outlay_cr: Option<f64>,
    #[serde(rename = "AmountSpentCr")]
    pub amount_spent_cr: f64,
    #[serde(rename = "ImplementationMode")]
    pub implementation_mode: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Company")]
    pub company: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearSpend {
    pub year: String,
    pub amount_spent_cr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorSpend {
    pub sector: String,
    pub amount_spent_cr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSpend {
    pub state: String,
    pub amount_spent_cr: f64,
    pub sectors: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Kpis {
    pub total_spent_cr: f64,
    pub project_count: usize,
    pub state_count: usize,
}

/// Everything the presentation layer renders for one selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dashboard {
    pub company: String,
    pub years: Vec<String>,
    pub kpis: Kpis,
    pub by_year: Vec<YearSpend>,
    pub by_sector: Vec<SectorSpend>,
    pub by_state: Vec<StateSpend>,
}

impl Dashboard {
    /// True when the selection matched no rows.
    pub fn is_empty(&self) -> bool {
        self.by_year.is_empty()
    }
}

#[derive(Debug, Tabled, Clone)]
pub struct YearSpendRow {
    #[tabled(rename = "Year")]
    pub year: String,
    #[tabled(rename = "AmountSpentCr")]
    pub amount_spent_cr: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct SectorSpendRow {
    #[tabled(rename = "Sector")]
    pub sector: String,
    #[tabled(rename = "AmountSpentCr")]
    pub amount_spent_cr: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct StateSpendRow {
    #[tabled(rename = "State")]
    pub state: String,
    #[tabled(rename = "AmountSpentCr")]
    pub amount_spent_cr: String,
    #[tabled(rename = "Sectors")]
    pub sectors: String,
}
