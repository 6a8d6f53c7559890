//! Terminal rendering shared by the classify and fetch commands.
//!
//! Data goes to stdout through `OutputWriter`; everything a person reads
//! (notices, summaries, the locked-spreadsheet warning) goes to stderr.

use console::Style;
use snapclass_core::{ClassificationResult, ResultsError, ResultsSheet};

/// Appends results to the spreadsheet, reporting problems without stopping
/// the run.
pub struct Recorder {
    sheet: Option<ResultsSheet>,
    rows_added: usize,
    failures: usize,
}

impl Recorder {
    /// `sheet` is `None` when saving is disabled (`--no-save`).
    pub fn new(sheet: Option<ResultsSheet>) -> Self {
        Self {
            sheet,
            rows_added: 0,
            failures: 0,
        }
    }

    pub fn record(&mut self, result: &ClassificationResult, filename: &str) {
        let Some(sheet) = &self.sheet else {
            return;
        };
        match sheet.append(result, filename) {
            Ok(added) => self.rows_added += added,
            Err(e) => {
                self.failures += 1;
                print_results_error(&e);
            }
        }
    }

    pub fn rows_added(&self) -> usize {
        self.rows_added
    }

    /// Summary line for the end of a run, if saving was enabled.
    pub fn summary(&self) -> Option<String> {
        let sheet = self.sheet.as_ref()?;
        let mut line = format!(
            "{} row(s) added to {}",
            self.rows_added,
            sheet.path().display()
        );
        if self.failures > 0 {
            line.push_str(&format!(" ({} write(s) failed)", self.failures));
        }
        Some(line)
    }
}

/// Show a results-sheet error. A locked file gets the user-facing wording.
pub fn print_results_error(e: &ResultsError) {
    match e {
        ResultsError::Locked { .. } => {
            let warn = Style::new().for_stderr().yellow().bold();
            eprintln!("  {} {e}", warn.apply_to("!"));
        }
        other => {
            tracing::error!("{other}");
        }
    }
}

pub fn print_success(message: &str) {
    let ok = Style::new().for_stderr().green();
    eprintln!("  {} {message}", ok.apply_to("✓"));
}

pub fn print_warning(message: &str) {
    let warn = Style::new().for_stderr().yellow();
    eprintln!("  {}", warn.apply_to(message));
}

/// Boxed end-of-run summary.
pub fn print_summary(title: &str, lines: &[(&str, String)]) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("  {title:^36}");
    eprintln!("  ====================================");
    for (label, value) in lines {
        eprintln!("    {:<14}{:>20}", format!("{label}:"), value);
    }
    eprintln!("  ====================================");
}
