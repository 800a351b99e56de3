pub mod accounting;
pub mod config;
pub mod data;
pub mod report;

use std::path::Path;

use chrono::NaiveDate;
use log::info;
use thiserror::Error;

use accounting::ledger::Journal;
use accounting::mapping::{map_records, MappingTable};
use accounting::schema::normalize;
use accounting::table::RawTable;
use accounting::template::{reconcile, OutputTable, Template};
use accounting::AccountingError;
use config::CompanyConfig;
use data::{DataError, InputFormat};
use report::Summary;

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("{0}")]
    Accounting(#[from] AccountingError),
    #[error("{0}")]
    Data(#[from] DataError),
}

/// Per-upload values supplied by the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub voucher_number: String,
    pub employee_number: String,
}

impl ConversionRequest {
    /// The voucher number is kept verbatim; it is only trimmed to check for blanks.
    pub fn new(voucher_number: &str, employee_number: &str) -> ConversionRequest {
        ConversionRequest {
            voucher_number: voucher_number.to_string(),
            employee_number: employee_number.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), AccountingError> {
        if self.voucher_number.trim().is_empty() {
            return Err(AccountingError::Validation("voucher number"));
        }
        if self.employee_number.trim().is_empty() {
            return Err(AccountingError::Validation("employee number"));
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Conversion {
    pub journal: Journal,
    pub output: OutputTable,
    pub summary: Summary,
}

fn run(
    table: &RawTable,
    request: &ConversionRequest,
    mapping: &MappingTable,
    template: Option<&Template>,
    config: &CompanyConfig,
    date: NaiveDate,
) -> Result<Conversion, ConversionError> {
    let normalized = normalize(table, config.schema())?;
    let outcome = map_records(normalized.records, mapping, config)?;

    let mut journal = Journal::generate(&outcome.resolved, config, &request.employee_number, date);
    journal.stamp_document(&request.voucher_number);

    let output = reconcile(&journal, template, config.erp());
    let summary = Summary::new(&normalized.report, &outcome, &journal);
    info!(
        "conversion finished: document {}, {} rows, total {}",
        summary.document_id,
        journal.len(),
        summary.total_amount
    );

    Ok(Conversion { journal, output, summary })
}

/// Runs the whole pipeline on an already loaded sheet.
pub fn convert_table(
    table: &RawTable,
    request: &ConversionRequest,
    mapping: &MappingTable,
    template: Option<&Template>,
    config: &CompanyConfig,
    date: NaiveDate,
) -> Result<Conversion, ConversionError> {
    request.validate()?;
    run(table, request, mapping, template, config, date)
}

pub fn convert_bytes(
    bytes: Vec<u8>,
    format: InputFormat,
    request: &ConversionRequest,
    mapping: &MappingTable,
    template: Option<&Template>,
    config: &CompanyConfig,
    date: NaiveDate,
) -> Result<Conversion, ConversionError> {
    request.validate()?;
    let table = data::read_raw_table_from_bytes(bytes, format)?;
    run(&table, request, mapping, template, config, date)
}

pub fn convert_file<P: AsRef<Path>>(
    path: P,
    request: &ConversionRequest,
    mapping: &MappingTable,
    template: Option<&Template>,
    config: &CompanyConfig,
    date: NaiveDate,
) -> Result<Conversion, ConversionError> {
    request.validate()?;
    let table = data::read_raw_table(path)?;
    run(&table, request, mapping, template, config, date)
}
