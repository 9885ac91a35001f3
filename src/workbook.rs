//! Merging every sheet of one company's workbook.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use tracing::{debug, warn};

use crate::error::{SheetError, WorkbookError};
use crate::sheet::{normalize_sheet, RejectedRow, SheetContext, PREAMBLE_ROWS};
use crate::types::CsrRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSheet {
    pub company: String,
    pub sheet: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct WorkbookMerge {
    pub company: String,
    pub records: Vec<CsrRecord>,
    /// Labels of the sheets that contributed, in source order.
    pub sheets: Vec<String>,
    pub skipped: Vec<SkippedSheet>,
    pub rejected: Vec<RejectedRow>,
}

/// Open `path` and merge its sheets under `company`.
///
/// The workbook is closed before normalisation starts.
pub fn merge_workbook(path: &Path, company: &str) -> Result<WorkbookMerge, WorkbookError> {
    let sheets: Vec<(String, Result<Range<Data>, String>)> = {
        let mut workbook = open_workbook_auto(path).map_err(|source| WorkbookError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let names = workbook.sheet_names().to_vec();
        names
            .into_iter()
            .map(|name| {
                let range = workbook.worksheet_range(&name).map_err(|e| e.to_string());
                (name, range)
            })
            .collect()
    };

    merge_sheets(company, sheets)
}

/// Normalise `sheets` in order and concatenate the results.
///
/// A failing sheet is recorded and skipped. When no sheet succeeds the result
/// is [`WorkbookError::PartialFailure`].
pub fn merge_sheets<I>(company: &str, sheets: I) -> Result<WorkbookMerge, WorkbookError>
where
    I: IntoIterator<Item = (String, Result<Range<Data>, String>)>,
{
    let mut merge = WorkbookMerge {
        company: company.to_string(),
        ..Default::default()
    };

    for (label, range) in sheets {
        let outcome = range
            .map_err(|reason| SheetError::Read {
                sheet: label.clone(),
                reason,
            })
            .and_then(|range| {
                let start_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
                let ctx = SheetContext {
                    skip_rows: PREAMBLE_ROWS.saturating_sub(start_row),
                    row_offset: start_row,
                    ..SheetContext::new(company, &label)
                };
                normalize_sheet(range.rows(), &ctx)
            });

        match outcome {
            Ok(sheet) => {
                debug!(
                    "{company}/{label}: {} rows, {} rejected",
                    sheet.records.len(),
                    sheet.rejected.len()
                );
                for rejected in &sheet.rejected {
                    warn!(
                        "{company}/{label}: row {} dropped, {} is not a number: {:?}",
                        rejected.row, rejected.field, rejected.value
                    );
                }
                merge.records.extend(sheet.records);
                merge.rejected.extend(sheet.rejected);
                merge.sheets.push(label);
            }
            Err(err) => {
                warn!("Skipping sheet {label} in {company}: {err}");
                merge.skipped.push(SkippedSheet {
                    company: company.to_string(),
                    sheet: err.sheet().to_string(),
                    reason: err.to_string(),
                });
            }
        }
    }

    if merge.sheets.is_empty() {
        return Err(WorkbookError::PartialFailure {
            company: company.to_string(),
            skipped: merge.skipped.len(),
        });
    }

    Ok(merge)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sheet::tests::{data_row, preamble, s};
    use pretty_assertions::assert_eq;

    pub(crate) fn range(rows: &[Vec<Data>]) -> Range<Data> {
        let width = rows.iter().map(Vec::len).max().unwrap_or(1).max(1);
        let mut range = Range::new((0, 0), (rows.len() as u32 - 1, width as u32 - 1));
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), value.clone());
            }
        }
        range
    }

    pub(crate) fn sheet(label: &str, amounts: &[f64]) -> (String, Result<Range<Data>, String>) {
        let mut rows = preamble();
        for (i, amount) in amounts.iter().enumerate() {
            rows.push(data_row(i as f64 + 1.0, &format!("P{i}"), "Health", "Goa", Data::Float(*amount)));
        }
        (label.to_string(), Ok(range(&rows)))
    }

    pub(crate) fn seven_column_sheet(label: &str) -> (String, Result<Range<Data>, String>) {
        let mut rows = preamble();
        rows.push(data_row(1.0, "Clinic", "Health", "Goa", Data::Float(1.0)));
        for row in &mut rows {
            row.pop();
        }
        (label.to_string(), Ok(range(&rows)))
    }

    #[test]
    fn preserves_sheet_order_and_labels() {
        let merge = merge_sheets(
            "Acme",
            vec![sheet("2022", &[1.0, 2.0]), sheet("2021", &[3.0]), sheet("FY 2023-24", &[4.0])],
        )
        .unwrap();

        assert_eq!(merge.sheets, vec!["2022", "2021", "FY 2023-24"]);
        let years: Vec<&str> = merge.records.iter().map(|r| r.year.as_str()).collect();
        assert_eq!(years, vec!["2022", "2022", "2021", "FY 2023-24"]);
        let amounts: Vec<f64> = merge.records.iter().map(|r| r.amount_spent_cr).collect();
        assert_eq!(amounts, vec![1.0, 2.0, 3.0, 4.0]);
        assert!(merge.records.iter().all(|r| r.company == "Acme"));
    }

    #[test]
    fn failing_sheet_does_not_abort_siblings() {
        let merge = merge_sheets(
            "Acme",
            vec![
                seven_column_sheet("2021"),
                ("2020".to_string(), Err("corrupt".to_string())),
                sheet("2022", &[5.0]),
            ],
        )
        .unwrap();

        assert_eq!(merge.sheets, vec!["2022"]);
        assert_eq!(merge.records.len(), 1);
        assert_eq!(merge.skipped.len(), 2);
        assert_eq!(merge.skipped[0].sheet, "2021");
        assert_eq!(merge.skipped[1].reason, "failed to read sheet `2020`: corrupt");
    }

    #[test]
    fn all_sheets_failing_is_a_partial_failure() {
        let err = merge_sheets("Acme", vec![seven_column_sheet("2021")]).unwrap_err();
        assert!(matches!(
            err,
            WorkbookError::PartialFailure { ref company, skipped: 1 } if company == "Acme"
        ));
    }

    #[test]
    fn workbook_without_sheets_is_a_partial_failure() {
        let err = merge_sheets("Acme", Vec::new()).unwrap_err();
        assert!(matches!(err, WorkbookError::PartialFailure { skipped: 0, .. }));
    }

    #[test]
    fn range_not_starting_at_a1_keeps_data_rows() {
        // Title row left empty: the used range begins at the header.
        let mut range = Range::new((1, 0), (2, 7));
        let rows = preamble();
        for (c, value) in rows[1].iter().enumerate() {
            range.set_value((1, c as u32), value.clone());
        }
        for (c, value) in data_row(1.0, "Clinic", "Health", "Goa", s("x")).into_iter().enumerate() {
            range.set_value((2, c as u32), value);
        }

        let merge = merge_sheets("Acme", vec![("2022".to_string(), Ok(range))]).unwrap();
        assert!(merge.records.is_empty());
        assert_eq!(merge.rejected[0].row, 3);
    }

    #[test]
    fn unreadable_file_is_an_open_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("Acme_CSR_Report.xlsx");
        std::fs::write(&path, b"not a spreadsheet").unwrap();
        assert!(matches!(merge_workbook(&path, "Acme"), Err(WorkbookError::Open { .. })));
    }
}
