use std::fs::{self, File};
use std::io::{BufReader, Cursor, Write};
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use encoding_rs::{Encoding, EUC_KR, UTF_8};
use log::{debug, info};
use rust_xlsxwriter::{Workbook, XlsxError};
use thiserror::Error;

use crate::accounting::mapping::{MappingEntry, MappingTable};
use crate::accounting::table::RawTable;
use crate::accounting::template::{OutputTable, Template};

/// Tried in order. `encoding_rs` decodes EUC-KR as the windows-949 superset,
/// so one decoder serves both Korean code page labels.
fn encodings() -> [(&'static str, &'static Encoding); 2] {
    [("utf-8", UTF_8), ("cp949/euc-kr", EUC_KR)]
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum DataError {
    #[error("file could not be decoded (tried: {})", .attempted.join(", "))]
    Decode { attempted: Vec<&'static str> },
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Csv(#[from] csv::Error),
    #[error("spreadsheet: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("spreadsheet has no worksheet")]
    EmptyWorkbook,
    #[error("mapping file: {0}")]
    MappingFile(#[from] serde_json::Error),
    #[error("spreadsheet export: {0}")]
    Xlsx(#[from] XlsxError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Delimited,
    Workbook,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> InputFormat {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => InputFormat::Workbook,
            _ => InputFormat::Delimited,
        }
    }
}

/// Decodes text with the first encoding that parses it without errors.
pub fn decode_text(bytes: &[u8]) -> Result<(String, &'static str), DataError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    for (label, encoding) in encodings() {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            return Ok((text.into_owned(), label));
        }
        debug!("decode failed, encoding={}", label);
    }

    Err(DataError::Decode {
        attempted: encodings().iter().map(|(label, _)| *label).collect(),
    })
}

fn read_delimited(text: &str) -> Result<(Vec<String>, Vec<Vec<String>>), DataError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = csv_reader.headers()?.iter().map(String::from).collect();
    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(record.iter().map(String::from).collect());
    }

    Ok((headers, rows))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(n) => n.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        other => other.to_string(),
    }
}

fn read_workbook(bytes: Vec<u8>) -> Result<(Vec<String>, Vec<Vec<String>>), DataError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook.worksheet_range_at(0).ok_or(DataError::EmptyWorkbook)??;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header) => header.iter().map(cell_to_string).collect(),
        None => Vec::new(),
    };
    let rows = rows.map(|row| row.iter().map(cell_to_string).collect()).collect();

    Ok((headers, rows))
}

pub fn read_raw_table_from_bytes(bytes: Vec<u8>, format: InputFormat) -> Result<RawTable, DataError> {
    let (headers, rows) = match format {
        InputFormat::Delimited => {
            let (text, encoding) = decode_text(&bytes)?;
            info!("input decoded as {}", encoding);
            read_delimited(&text)?
        },
        InputFormat::Workbook => read_workbook(bytes)?,
    };

    info!("loaded {} rows, {} columns", rows.len(), headers.len());
    Ok(RawTable::new(headers, rows))
}

pub fn read_raw_table<P: AsRef<Path>>(path: P) -> Result<RawTable, DataError> {
    let path = path.as_ref();
    read_raw_table_from_bytes(fs::read(path)?, InputFormat::from_path(path))
}

pub fn parse_mapping_table(json: &str) -> Result<MappingTable, DataError> {
    let entries: Vec<MappingEntry> = serde_json::from_str(json)?;
    Ok(MappingTable::from_entries(entries))
}

pub fn load_mapping_table<P: AsRef<Path>>(path: P) -> Result<MappingTable, DataError> {
    let reader = BufReader::new(File::open(path)?);
    let entries: Vec<MappingEntry> = serde_json::from_reader(reader)?;
    Ok(MappingTable::from_entries(entries))
}

pub fn parse_template(bytes: &[u8]) -> Result<Template, DataError> {
    let (text, _) = decode_text(bytes)?;
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(text.as_bytes());

    let columns = csv_reader.headers()?.iter().map(|c| c.trim().to_string()).collect();
    let mut leading_rows = Vec::new();
    for record in csv_reader.records() {
        leading_rows.push(record?.iter().map(String::from).collect());
    }

    Ok(Template::new(columns, leading_rows))
}

pub fn load_template<P: AsRef<Path>>(path: P) -> Result<Template, DataError> {
    let template = parse_template(&fs::read(path.as_ref())?)?;
    info!("template loaded from {}", path.as_ref().display());
    Ok(template)
}

/// CSV with a UTF-8 BOM so spreadsheet programs pick the right encoding.
pub fn export_csv<W: Write>(table: &OutputTable, mut writer: W) -> Result<(), DataError> {
    writer.write_all(UTF8_BOM)?;

    let mut csv_writer = csv::WriterBuilder::new().flexible(false).from_writer(writer);
    csv_writer.write_record(table.columns())?;
    for row in table.rows() {
        csv_writer.write_record(row)?;
    }

    csv_writer.flush()?;

    Ok(())
}

/// Single-sheet workbook: the column header line, then every row as text so
/// codes such as `00616` keep their leading zeros.
pub fn export_xlsx(table: &OutputTable) -> Result<Vec<u8>, DataError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in table.columns().iter().enumerate() {
        worksheet.write_string(0, col as u16, name.as_str())?;
    }
    for (idx, row) in table.rows().iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(idx as u32 + 1, col as u16, value.as_str())?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Path of the staging file a write goes through before its final rename.
pub fn staging_path(path: &Path) -> PathBuf {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".partial");
    PathBuf::from(staging)
}

/// Writes next to the destination first and renames, so a failure never
/// leaves a partial output file behind.
fn write_staged<F>(path: &Path, write: F) -> Result<(), DataError>
where
    F: FnOnce(File) -> Result<(), DataError>,
{
    let staging = staging_path(path);

    let result = File::create(&staging)
        .map_err(DataError::from)
        .and_then(write)
        .and_then(|_| fs::rename(&staging, path).map_err(DataError::from));

    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }

    result
}

pub fn write_output<P: AsRef<Path>>(table: &OutputTable, path: P) -> Result<(), DataError> {
    write_staged(path.as_ref(), |file| export_csv(table, file))
}

pub fn write_output_xlsx<P: AsRef<Path>>(table: &OutputTable, path: P) -> Result<(), DataError> {
    let bytes = export_xlsx(table)?;
    write_staged(path.as_ref(), |mut file| {
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(())
    })
}
