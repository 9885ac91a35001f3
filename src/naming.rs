//! Company names from workbook file names.
//!
//! Workbooks are expected to be named `<Company><marker>.<ext>`, for example
//! `Acme_CSR_Report.xlsx`. Anything after the marker (`_v2`, `_final`) is
//! ignored.

use crate::error::NameError;

#[derive(Debug, Clone)]
pub struct CompanyNameParser {
    marker: String,
    extension: String,
}

impl CompanyNameParser {
    pub fn new(marker: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    /// Case-insensitive check of the file-type marker.
    pub fn matches_extension(&self, file_name: &str) -> bool {
        self.stem(file_name).is_some()
    }

    pub fn parse(&self, file_name: &str) -> Result<String, NameError> {
        let stem = self.stem(file_name).ok_or_else(|| NameError::Extension {
            file: file_name.to_string(),
            extension: self.extension.clone(),
        })?;
        let Some(idx) = stem.find(&self.marker) else {
            return Err(NameError::MissingMarker {
                file: file_name.to_string(),
                marker: self.marker.clone(),
            });
        };
        let company = stem[..idx].trim();
        if company.is_empty() {
            return Err(NameError::EmptyCompany {
                file: file_name.to_string(),
                marker: self.marker.clone(),
            });
        }
        Ok(company.to_string())
    }

    fn stem<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        let (stem, ext) = file_name.rsplit_once('.')?;
        ext.eq_ignore_ascii_case(&self.extension).then_some(stem)
    }
}
