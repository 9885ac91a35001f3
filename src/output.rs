use serde::Serialize;
use std::fmt::Write;
use tabled::{settings::Style, Table, Tabled};

use crate::types::{Dashboard, SectorSpendRow, StateSpendRow, YearSpendRow};
use crate::util::{format_int, format_number};

pub fn to_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// First `max_rows` rows as a markdown table, or `(no rows)`.
pub fn preview_table_rows<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        return "(no rows)\n".to_string();
    }
    let mut out = Table::new(slice).with(Style::markdown()).to_string();
    out.push('\n');
    if rows.len() > max_rows {
        out.push_str(&format!("({} more rows)\n", rows.len() - max_rows));
    }
    out
}

pub fn year_rows(dash: &Dashboard) -> Vec<YearSpendRow> {
    dash.by_year
        .iter()
        .map(|v| YearSpendRow {
            year: v.year.clone(),
            amount_spent_cr: format_number(v.amount_spent_cr, 2),
        })
        .collect()
}

pub fn sector_rows(dash: &Dashboard) -> Vec<SectorSpendRow> {
    dash.by_sector
        .iter()
        .map(|v| SectorSpendRow {
            sector: v.sector.clone(),
            amount_spent_cr: format_number(v.amount_spent_cr, 2),
        })
        .collect()
}

pub fn state_rows(dash: &Dashboard) -> Vec<StateSpendRow> {
    dash.by_state
        .iter()
        .map(|v| StateSpendRow {
            state: v.state.clone(),
            amount_spent_cr: format_number(v.amount_spent_cr, 2),
            sectors: v.sectors.clone(),
        })
        .collect()
}

/// KPIs followed by the year, sector and state tables.
pub fn render_dashboard(dash: &Dashboard, max_rows: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## {}\n", dash.company);
    if dash.is_empty() {
        let _ = writeln!(out, "No rows match the selected company and years.");
        return out;
    }
    let _ = writeln!(out, "Years: {}", dash.years.join(", "));
    let _ = writeln!(out, "Total Spent (Cr): {}", format_number(dash.kpis.total_spent_cr, 2));
    let _ = writeln!(out, "Projects: {}", format_int(dash.kpis.project_count));
    let _ = writeln!(out, "States Covered: {}\n", format_int(dash.kpis.state_count));

    let _ = writeln!(out, "Year-wise Spend\n");
    out.push_str(&preview_table_rows(&year_rows(dash), max_rows));
    let _ = writeln!(out, "\nSector-wise Spend\n");
    out.push_str(&preview_table_rows(&sector_rows(dash), max_rows));
    let _ = writeln!(out, "\nState-wise Spend\n");
    out.push_str(&preview_table_rows(&state_rows(dash), max_rows));
    out
}
