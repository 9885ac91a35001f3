//! Normalisation of a single disclosure sheet into [`CsrRecord`]s.

use calamine::Data;

use crate::error::SheetError;
use crate::types::{CsrRecord, FieldDescriptor, FieldKind, SOURCE_COLUMNS, SOURCE_FIELDS};
use crate::util::parse_f64_safe;

/// Title row plus header row.
pub const PREAMBLE_ROWS: usize = 2;

#[derive(Debug, Clone, Copy)]
pub struct SheetContext<'a> {
    pub company: &'a str,
    /// Sheet label, stamped verbatim as the record's year.
    pub year: &'a str,
    /// Leading rows to discard. The last of them is the header row.
    pub skip_rows: usize,
    /// Worksheet row number of the first row handed to the normaliser, minus one.
    pub row_offset: usize,
}

impl<'a> SheetContext<'a> {
    pub fn new(company: &'a str, year: &'a str) -> Self {
        Self {
            company,
            year,
            skip_rows: PREAMBLE_ROWS,
            row_offset: 0,
        }
    }
}

/// A data row dropped because a numeric field could not be read.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    pub sheet: String,
    pub row: usize,
    pub field: &'static str,
    pub value: String,
}

#[derive(Debug, Default, Clone)]
pub struct NormalizedSheet {
    pub records: Vec<CsrRecord>,
    pub rejected: Vec<RejectedRow>,
}

/// Convert the raw rows of one sheet into canonical records.
///
/// The header row and every data row must have exactly [`SOURCE_COLUMNS`]
/// cells or the whole sheet is refused. Fully blank data rows are ignored.
pub fn normalize_sheet<'r, I>(rows: I, ctx: &SheetContext<'_>) -> Result<NormalizedSheet, SheetError>
where
    I: IntoIterator<Item = &'r [Data]>,
{
    let mut out = NormalizedSheet::default();
    let mut seen_rows = 0usize;

    for (idx, row) in rows.into_iter().enumerate() {
        seen_rows += 1;
        let row_no = ctx.row_offset + idx + 1;
        if idx + 1 < ctx.skip_rows {
            continue;
        }
        let is_header = idx + 1 == ctx.skip_rows;
        if !is_header && is_blank(row) {
            continue;
        }
        if row.len() != SOURCE_COLUMNS {
            return Err(SheetError::SchemaMismatch {
                sheet: ctx.year.to_string(),
                expected: SOURCE_COLUMNS,
                found: row.len(),
                row: row_no,
            });
        }
        if is_header {
            continue;
        }
        match to_record(row, ctx, row_no) {
            Ok(record) => out.records.push(record),
            Err(rejected) => out.rejected.push(rejected),
        }
    }

    if seen_rows == 0 {
        return Err(SheetError::SchemaMismatch {
            sheet: ctx.year.to_string(),
            expected: SOURCE_COLUMNS,
            found: 0,
            row: ctx.row_offset + 1,
        });
    }

    Ok(out)
}

fn to_record(row: &[Data], ctx: &SheetContext<'_>, row_no: usize) -> Result<CsrRecord, RejectedRow> {
    let reject = |field: &FieldDescriptor, value: String| RejectedRow {
        sheet: ctx.year.to_string(),
        row: row_no,
        field: field.name,
        value,
    };

    let mut amounts = [None; SOURCE_COLUMNS];
    for (col, field) in SOURCE_FIELDS.iter().enumerate() {
        match field.kind {
            FieldKind::Text => {}
            FieldKind::OptionalAmount => {
                amounts[col] = cell_amount(&row[col]).map_err(|raw| reject(field, raw))?;
            }
            FieldKind::Amount => match cell_amount(&row[col]) {
                Ok(Some(v)) => amounts[col] = Some(v),
                Ok(None) => return Err(reject(field, String::new())),
                Err(raw) => return Err(reject(field, raw)),
            },
        }
    }

    Ok(CsrRecord {
        serial_no: cell_text(&row[0]),
        project: cell_text(&row[1]),
        sector: cell_text(&row[2]),
        state: cell_text(&row[3]),
        district: cell_text(&row[4]),
        budget_outlay_cr: amounts[5],
        // Required field, checked in the loop above.
        amount_spent_cr: amounts[6].unwrap_or_default(),
        implementation_mode: cell_text(&row[7]),
        year: ctx.year.to_string(),
        company: ctx.company.to_string(),
    })
}

fn cell_text(cell: &Data) -> String {
    cell.to_string().trim().to_string()
}

/// `Ok(None)` for a blank cell, `Err(raw)` for anything that is not a number.
fn cell_amount(cell: &Data) -> Result<Option<f64>, String> {
    match cell {
        Data::Empty => Ok(None),
        Data::Float(v) if v.is_finite() => Ok(Some(*v)),
        Data::Int(v) => Ok(Some(*v as f64)),
        Data::String(s) if s.trim().is_empty() => Ok(None),
        Data::String(s) => parse_f64_safe(Some(s)).map(Some).ok_or_else(|| s.clone()),
        other => Err(other.to_string()),
    }
}

fn is_blank(row: &[Data]) -> bool {
    row.iter().all(|cell| match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    pub(crate) fn preamble() -> Vec<Vec<Data>> {
        vec![
            vec![s("CSR Projects FY"), Data::Empty, Data::Empty, Data::Empty, Data::Empty, Data::Empty, Data::Empty, Data::Empty],
            vec![s("S.No"), s("Project"), s("Sector"), s("State"), s("District"), s("Outlay"), s("Spent"), s("Mode")],
        ]
    }

    pub(crate) fn data_row(serial: f64, project: &str, sector: &str, state: &str, amount: Data) -> Vec<Data> {
        vec![
            Data::Float(serial),
            s(project),
            s(sector),
            s(state),
            s("Pune"),
            Data::Float(20.0),
            amount,
            s("Direct"),
        ]
    }

    fn run(rows: &[Vec<Data>]) -> Result<NormalizedSheet, SheetError> {
        normalize_sheet(rows.iter().map(Vec::as_slice), &SheetContext::new("Acme", "2022"))
    }

    #[test]
    fn emits_one_record_per_data_row() {
        let mut rows = preamble();
        rows.push(data_row(1.0, "Clinic", "Health", "Maharashtra", Data::Float(10.0)));
        rows.push(data_row(2.0, "School", "Education", "Gujarat", Data::Int(7)));
        rows.push(data_row(3.0, "Wells", "Water", "Gujarat", s("1,250.75")));

        let sheet = run(&rows).unwrap();
        assert_eq!(sheet.records.len(), 3);
        assert!(sheet.rejected.is_empty());

        let first = &sheet.records[0];
        assert_eq!(first.serial_no, "1");
        assert_eq!(first.project, "Clinic");
        assert_eq!(first.district, "Pune");
        assert_eq!(first.budget_outlay_cr, Some(20.0));
        assert_eq!(first.amount_spent_cr, 10.0);
        assert_eq!(first.implementation_mode, "Direct");
        assert_eq!(sheet.records[2].amount_spent_cr, 1250.75);
        assert!(sheet.records.iter().all(|r| r.year == "2022" && r.company == "Acme"));
    }

    #[test]
    fn header_text_is_never_used() {
        let mut rows = preamble();
        rows[1] = vec![s("a"), s("b"), s("c"), s("d"), s("e"), s("f"), s("g"), s("h")];
        rows.push(data_row(1.0, "Clinic", "Health", "Goa", Data::Float(1.0)));
        let sheet = run(&rows).unwrap();
        assert_eq!(sheet.records[0].sector, "Health");
    }

    #[test]
    fn preamble_only_sheet_is_empty_but_valid() {
        let sheet = run(&preamble()).unwrap();
        assert!(sheet.records.is_empty());
    }

    #[test]
    fn seven_columns_fail_the_whole_sheet() {
        let mut rows: Vec<Vec<Data>> = preamble()
            .into_iter()
            .map(|mut r| {
                r.pop();
                r
            })
            .collect();
        let mut row = data_row(1.0, "Clinic", "Health", "Goa", Data::Float(1.0));
        row.pop();
        rows.push(row);

        let err = run(&rows).unwrap_err();
        match err {
            SheetError::SchemaMismatch { sheet, expected, found, row } => {
                assert_eq!(sheet, "2022");
                assert_eq!(expected, 8);
                assert_eq!(found, 7);
                assert_eq!(row, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn short_data_row_discards_earlier_rows_too() {
        let mut rows = preamble();
        rows.push(data_row(1.0, "Clinic", "Health", "Goa", Data::Float(1.0)));
        rows.push(vec![Data::Float(2.0), s("School")]);
        assert!(matches!(run(&rows), Err(SheetError::SchemaMismatch { found: 2, row: 4, .. })));
    }

    #[test]
    fn empty_sheet_is_a_mismatch() {
        assert!(matches!(run(&[]), Err(SheetError::SchemaMismatch { found: 0, .. })));
    }

    #[test]
    fn blank_rows_are_skipped() {
        let mut rows = preamble();
        rows.push(vec![Data::Empty; 8]);
        rows.push(data_row(1.0, "Clinic", "Health", "Goa", Data::Float(4.0)));
        rows.push(vec![s("  "), Data::Empty]);
        let sheet = run(&rows).unwrap();
        assert_eq!(sheet.records.len(), 1);
    }

    #[test]
    fn non_numeric_amount_rejects_only_that_row() {
        let mut rows = preamble();
        rows.push(data_row(1.0, "Clinic", "Health", "Goa", s("NA")));
        rows.push(data_row(2.0, "School", "Education", "Goa", Data::Float(3.0)));
        rows.push(data_row(3.0, "Road", "Rural", "Goa", Data::Empty));

        let sheet = run(&rows).unwrap();
        assert_eq!(sheet.records.len(), 1);
        assert_eq!(sheet.records[0].project, "School");
        assert_eq!(
            sheet.rejected,
            vec![
                RejectedRow {
                    sheet: "2022".to_string(),
                    row: 3,
                    field: "AmountSpentCr",
                    value: "NA".to_string(),
                },
                RejectedRow {
                    sheet: "2022".to_string(),
                    row: 5,
                    field: "AmountSpentCr",
                    value: String::new(),
                },
            ]
        );
    }

    #[test]
    fn blank_budget_is_allowed_but_text_budget_is_not() {
        let mut rows = preamble();
        let mut blank_budget = data_row(1.0, "Clinic", "Health", "Goa", Data::Float(2.0));
        blank_budget[5] = Data::Empty;
        let mut text_budget = data_row(2.0, "School", "Education", "Goa", Data::Float(2.0));
        text_budget[5] = s("TBD");
        rows.push(blank_budget);
        rows.push(text_budget);

        let sheet = run(&rows).unwrap();
        assert_eq!(sheet.records.len(), 1);
        assert_eq!(sheet.records[0].budget_outlay_cr, None);
        assert_eq!(sheet.rejected[0].field, "BudgetOutlayCr");
    }

    #[test]
    fn row_offset_shifts_reported_row_numbers() {
        let mut rows = vec![preamble().remove(1)];
        rows.push(data_row(1.0, "Clinic", "Health", "Goa", s("x")));
        let ctx = SheetContext {
            skip_rows: 1,
            row_offset: 1,
            ..SheetContext::new("Acme", "2022")
        };
        let sheet = normalize_sheet(rows.iter().map(Vec::as_slice), &ctx).unwrap();
        assert_eq!(sheet.rejected[0].row, 3);
    }
}
