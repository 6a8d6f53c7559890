//! Classification results spreadsheet.
//!
//! One worksheet with the header `Class ID | Class Name | Class Rating |
//! Filename`. Each call to [`ResultsSheet::append`] adds one batch (the top-5
//! rows of one image) followed by a blank separator row. Rows already present
//! are not written again.

use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};

use crate::error::ResultsError;
use crate::types::ClassificationResult;

/// Column headers, in order.
pub const HEADER: [&str; 4] = ["Class ID", "Class Name", "Class Rating", "Filename"];

const SHEET_NAME: &str = "Results";

/// One prediction row.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub class_id: String,
    pub class_name: String,
    pub rating: f64,
    pub filename: String,
}

/// Handle to the results workbook on disk.
#[derive(Debug, Clone)]
pub struct ResultsSheet {
    path: PathBuf,
}

impl ResultsSheet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append the predictions for one image. Returns the number of rows added;
    /// zero means every row was already in the sheet and the file is untouched.
    pub fn append(
        &self,
        result: &ClassificationResult,
        filename: &str,
    ) -> Result<usize, ResultsError> {
        let mut rows = self.read_rows()?;

        let new_rows: Vec<ResultRow> = result
            .predictions
            .iter()
            .map(|p| ResultRow {
                class_id: p.class_id.clone(),
                class_name: p.class_name.clone(),
                rating: p.confidence,
                filename: filename.to_string(),
            })
            .filter(|row| !rows.iter().flatten().any(|existing| existing == row))
            .collect();

        if new_rows.is_empty() {
            tracing::debug!("Results for {filename} already recorded");
            return Ok(0);
        }

        // A trailing blank row is not stored, so restore the separator.
        if matches!(rows.last(), Some(Some(_))) {
            rows.push(None);
        }
        let added = new_rows.len();
        rows.extend(new_rows.into_iter().map(Some));
        rows.push(None);

        self.write_rows(&rows)?;
        tracing::info!("Results for {filename} saved to {}", self.path.display());
        Ok(added)
    }

    /// All rows below the header. `None` marks a blank separator row.
    pub fn read_rows(&self) -> Result<Vec<Option<ResultRow>>, ResultsError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let read_err = |message: String| ResultsError::Read {
            path: self.path.clone(),
            message,
        };

        let mut workbook: Xlsx<_> =
            Xlsx::new(Cursor::new(bytes)).map_err(|e| read_err(e.to_string()))?;
        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range.map_err(|e| read_err(e.to_string()))?,
            None => return Ok(Vec::new()),
        };

        let mut rows = Vec::new();
        for (i, cells) in range.rows().enumerate() {
            if i == 0 && cell_text(cells.first()) == HEADER[0] {
                continue;
            }
            if cells.iter().all(|c| matches!(c, Data::Empty)) {
                rows.push(None);
                continue;
            }
            let rating = match cells.get(2) {
                Some(Data::Float(f)) => *f,
                Some(Data::Int(n)) => *n as f64,
                other => cell_text(other)
                    .parse()
                    .map_err(|_| read_err(format!("row {}: rating is not a number", i + 1)))?,
            };
            rows.push(Some(ResultRow {
                class_id: cell_text(cells.first()),
                class_name: cell_text(cells.get(1)),
                rating,
                filename: cell_text(cells.get(3)),
            }));
        }
        Ok(rows)
    }

    fn write_rows(&self, rows: &[Option<ResultRow>]) -> Result<(), ResultsError> {
        let write_err = |e: rust_xlsxwriter::XlsxError| ResultsError::Write {
            path: self.path.clone(),
            message: e.to_string(),
        };

        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME).map_err(write_err)?;

        for (col, title) in HEADER.iter().enumerate() {
            sheet
                .write_string_with_format(0, col as u16, *title, &bold)
                .map_err(write_err)?;
        }

        for (i, row) in rows.iter().enumerate() {
            let Some(row) = row else { continue };
            let r = i as u32 + 1;
            sheet.write_string(r, 0, &row.class_id).map_err(write_err)?;
            sheet.write_string(r, 1, &row.class_name).map_err(write_err)?;
            sheet.write_number(r, 2, row.rating).map_err(write_err)?;
            sheet.write_string(r, 3, &row.filename).map_err(write_err)?;
        }

        let buffer = workbook.save_to_buffer().map_err(write_err)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, buffer).map_err(|e| self.io_error(e))
    }

    fn io_error(&self, e: io::Error) -> ResultsError {
        if is_lock_error(&e) {
            ResultsError::Locked {
                path: self.path.clone(),
            }
        } else {
            ResultsError::Io {
                path: self.path.clone(),
                source: e,
            }
        }
    }
}

/// Another program holds the file. On Windows a workbook open in Excel fails
/// with a sharing or lock violation rather than `PermissionDenied`.
fn is_lock_error(e: &io::Error) -> bool {
    if e.kind() == io::ErrorKind::PermissionDenied {
        return true;
    }
    #[cfg(windows)]
    {
        const ERROR_SHARING_VIOLATION: i32 = 32;
        const ERROR_LOCK_VIOLATION: i32 = 33;
        if matches!(
            e.raw_os_error(),
            Some(ERROR_SHARING_VIOLATION | ERROR_LOCK_VIOLATION)
        ) {
            return true;
        }
    }
    false
}

fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
