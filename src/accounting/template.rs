use log::debug;

use super::ledger::{Journal, ERP_COLUMNS, GENERATED_COLUMNS};
use crate::config::ErpSettings;

/// Target layout of the ERP upload sheet: its column order and the
/// header/metadata rows that sit above the journal data.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    columns: Vec<String>,
    leading_rows: Vec<Vec<String>>,
}

impl Template {
    pub fn new(columns: Vec<String>, leading_rows: Vec<Vec<String>>) -> Template {
        let width = columns.len();
        let leading_rows = leading_rows.into_iter().map(|row| fit_width(row, width)).collect();
        Template { columns, leading_rows }
    }

    /// The full ERP column set with no leading rows of its own.
    pub fn erp_standard() -> Template {
        Template::new(ERP_COLUMNS.iter().map(|c| c.to_string()).collect(), Vec::new())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn leading_rows(&self) -> &[Vec<String>] {
        &self.leading_rows
    }
}

fn fit_width(mut row: Vec<String>, width: usize) -> Vec<String> {
    row.resize(width, String::new());
    row
}

/// Final sheet contents: column header, leading block, then journal rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    leading: usize,
}

impl OutputTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Every row below the column header, leading block included.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn leading_rows(&self) -> &[Vec<String>] {
        &self.rows[..self.leading]
    }

    pub fn data_rows(&self) -> &[Vec<String>] {
        &self.rows[self.leading..]
    }

    pub fn column_values(&self, column: &str) -> Option<Vec<&str>> {
        let idx = self.columns.iter().position(|c| c == column)?;
        Some(self.data_rows().iter().map(|r| r[idx].as_str()).collect())
    }
}

/// Lays the journal out on the template, or on the generated columns when
/// there is none. The leading block is padded with blank rows or truncated
/// so data always starts at the configured sheet row.
pub fn reconcile(journal: &Journal, template: Option<&Template>, erp: &ErpSettings) -> OutputTable {
    let leading = erp.leading_rows();

    let (columns, mut rows): (Vec<String>, Vec<Vec<String>>) = match template {
        Some(template) => {
            let kept = template.leading_rows().len().min(leading);
            debug!(
                "applying template: {} columns, {} of {} leading rows kept",
                template.columns().len(),
                kept,
                template.leading_rows().len()
            );
            (template.columns().to_vec(), template.leading_rows()[..kept].to_vec())
        },
        None => (GENERATED_COLUMNS.iter().map(|c| c.to_string()).collect(), Vec::new()),
    };

    let width = columns.len();
    while rows.len() < leading {
        rows.push(vec![String::new(); width]);
    }

    rows.extend(journal.rows().iter().map(|row| row.to_record(&columns)));

    OutputTable { columns, rows, leading }
}
