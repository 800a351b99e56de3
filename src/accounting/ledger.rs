use chrono::NaiveDate;
use log::{debug, info};
use rust_decimal::Decimal;

use super::mapping::MappedRecord;
use crate::config::CompanyConfig;

/// Columns the generator fills, in ERP order.
pub const GENERATED_COLUMNS: &[&str] = &[
    "ROW_ID", "ROW_NO", "NO_TAX", "CD_PC", "CD_WDEPT", "NO_DOCU", "NO_DOLINE", "CD_COMPANY", "ID_WRITE", "CD_DOCU",
    "DT_ACCT", "ST_DOCU", "TP_DRCR", "CD_ACCT", "AMT", "CD_PARTNER", "NM_NOTE", "CD_DEPT", "CD_CC", "CD_PJT",
    "TP_DOCU", "NO_ACCT", "TP_GUBUN",
];

/// Full import layout of the ERP voucher upload sheet.
pub const ERP_COLUMNS: &[&str] = &[
    "ROW_ID", "ROW_NO", "NO_TAX", "CD_PC", "CD_WDEPT", "NO_DOCU", "NO_DOLINE", "CD_COMPANY", "ID_WRITE", "CD_DOCU",
    "DT_ACCT", "ST_DOCU", "TP_DRCR", "CD_ACCT", "AMT", "CD_PARTNER", "DT_START", "DT_END", "AM_TAXSTD", "AM_ADDTAX",
    "TP_TAX", "NO_COMPANY", "NM_NOTE", "CD_BIZAREA", "CD_DEPT", "CD_CC", "CD_PJT", "CD_FUND", "CD_BUDGET", "NO_CASH",
    "ST_MUTUAL", "CD_CARD", "NO_DEPOSIT", "CD_BANK", "UCD_MNG1", "UCD_MNG2", "UCD_MNG3", "UCD_MNG4", "UCD_MNG5",
    "CD_EMPLOY", "CD_MNG", "NO_BDOCU", "NO_BDOLINE", "TP_DOCU", "NO_ACCT", "TP_TRADE", "NO_CHECK3", "NO_CHECK4",
    "CD_EXCH", "RT_EXCH", "CD_TRADE", "AM_EX", "TP_EXPORT", "NO_TO", "DT_SHIPPING", "TP_GUBUN", "NO_INVOICE",
    "NO_ITEM", "MD_TAX1", "NM_ITEM1", "NM_SIZE1", "QT_TAX1", "AM_PRC1", "AM_SUPPLY1", "AM_TAX1", "NM_NOTE1",
    "CD_BIZPLAN", "CD_BGACCT", "CD_MNGD1", "NM_MNGD1", "CD_MNGD2", "NM_MNGD2", "CD_MNGD3", "NM_MNGD3", "CD_MNGD4",
    "NM_MNGD4", "CD_MNGD5", "NM_MNGD5", "CD_MNGD6", "NM_MNGD6", "CD_MNGD7", "NM_MNGD7", "CD_MNGD8", "NM_MNGD8",
    "YN_ISS", "FINAL_STATUS", "NO_BILL", "NM_BIGO", "TP_BILL", "TP_RECORD", "TP_ETCACCT", "ST_GWARE", "SELL_DAM_NM",
    "SELL_DAM_EMAIL", "SELL_DAM_MOBIL", "SELL_DAM_TEL", "NM_PUMM", "JEONJASEND15_YN", "DT_WRITE", "ST_TAX", "MD_TAX2",
    "NM_ITEM2", "NM_SIZE2", "QT_TAX2", "AM_PRC2", "AM_SUPPLY2", "AM_TAX2", "NM_NOTE2", "MD_TAX3", "NM_ITEM3",
    "NM_SIZE3", "QT_TAX3", "AM_PRC3", "AM_SUPPLY3", "AM_TAX3", "NM_NOTE3", "MD_TAX4", "NM_ITEM4", "NM_SIZE4",
    "QT_TAX4", "AM_PRC4", "AM_SUPPLY4", "AM_TAX4", "NM_NOTE4", "NM_PTR", "EX_HP", "EX_EMIL", "NO_BIZTAX", "NO_ASSET",
    "TP_EVIDENCE", "NO_CAR", "NO_CARBODY", "CD_BIZCAR", "NM_PARTNER", "YN_IMPORT", "YN_FIXASSET",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Debit,
    Credit,
}

impl Side {
    pub fn code(&self) -> &'static str {
        match self {
            Side::Debit => "1",
            Side::Credit => "2",
        }
    }
}

/// One journal line. Columns not modelled here export as empty text.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub document_id: String,
    pub line_no: usize,
    pub side: Side,
    pub account_code: String,
    pub amount: Decimal,
    pub partner_code: String,
    pub note: String,
    pub cost_center_code: String,
    pub department_code: String,
    pub project_code: Option<i64>,
    pub accounting_unit: String,
    pub writing_department: String,
    pub company_code: String,
    pub written_by: String,
    pub document_type: String,
    pub accounting_date: String,
    pub approval_status: String,
    pub process_status: String,
    pub document_kind: String,
}

impl LedgerRow {
    /// Cell text for an ERP column name, `None` for columns the generator does not fill.
    pub fn value(&self, column: &str) -> Option<String> {
        let value = match column {
            "ROW_ID" | "NO_DOCU" => self.document_id.clone(),
            "ROW_NO" | "NO_DOLINE" => self.line_no.to_string(),
            "NO_TAX" => "*".to_string(),
            "CD_PC" => self.accounting_unit.clone(),
            "CD_WDEPT" => self.writing_department.clone(),
            "CD_COMPANY" => self.company_code.clone(),
            "ID_WRITE" => self.written_by.clone(),
            "CD_DOCU" => self.document_type.clone(),
            "DT_ACCT" => self.accounting_date.clone(),
            "ST_DOCU" => self.approval_status.clone(),
            "TP_DRCR" => self.side.code().to_string(),
            "CD_ACCT" => self.account_code.clone(),
            "AMT" => self.amount.trunc().to_string(),
            "CD_PARTNER" => self.partner_code.clone(),
            "NM_NOTE" => self.note.clone(),
            "CD_DEPT" => self.department_code.clone(),
            "CD_CC" => self.cost_center_code.clone(),
            "CD_PJT" => self.project_code.map(|c| c.to_string()).unwrap_or_default(),
            "TP_DOCU" => self.process_status.clone(),
            "NO_ACCT" => "0".to_string(),
            "TP_GUBUN" => self.document_kind.clone(),
            _ => return None,
        };

        Some(value)
    }

    pub fn to_record<S: AsRef<str>>(&self, columns: &[S]) -> Vec<String> {
        columns
            .iter()
            .map(|c| self.value(c.as_ref()).unwrap_or_default())
            .collect()
    }
}

/// `FI<YYYYMMDD><last 3 chars of identity>`.
pub fn document_id(date: NaiveDate, identity: &str) -> String {
    let chars: Vec<char> = identity.trim().chars().collect();
    let tail: String = chars[chars.len().saturating_sub(3)..].iter().collect();
    format!("FI{}{}", date.format("%Y%m%d"), tail)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Journal {
    rows: Vec<LedgerRow>,
}

impl Journal {
    /// One debit row per record in input order, then one credit row for the total.
    pub fn generate(records: &[MappedRecord], config: &CompanyConfig, identity: &str, date: NaiveDate) -> Journal {
        let document = document_id(date, identity);
        let erp = config.erp();
        let base = LedgerRow {
            document_id: document,
            line_no: 0,
            side: Side::Debit,
            account_code: String::new(),
            amount: Decimal::ZERO,
            partner_code: config.partner_code().clone(),
            note: String::new(),
            cost_center_code: config.cost_center().clone(),
            department_code: config.department_code().clone(),
            project_code: None,
            accounting_unit: config.accounting_unit().clone(),
            writing_department: config.writing_department().clone(),
            company_code: config.company_code().clone(),
            written_by: identity.trim().to_string(),
            document_type: erp.document_type().clone(),
            accounting_date: date.format("%Y%m%d").to_string(),
            approval_status: erp.approval_status().clone(),
            process_status: erp.process_status().clone(),
            document_kind: erp.document_kind().clone(),
        };

        let mut rows: Vec<LedgerRow> = records
            .iter()
            .enumerate()
            .map(|(idx, record)| LedgerRow {
                line_no: idx + 1,
                account_code: record.account_code.trim().to_string(),
                amount: record.source.amount.trunc(),
                partner_code: record.partner_code.clone(),
                note: record.note.clone(),
                cost_center_code: record.cost_center_code.clone(),
                project_code: Some(record.project_code_number(*erp.default_project_code())),
                ..base.clone()
            })
            .collect();

        let total: Decimal = rows.iter().map(|r| r.amount).sum();
        rows.push(LedgerRow {
            line_no: rows.len() + 1,
            side: Side::Credit,
            account_code: config.payable_account().clone(),
            amount: total,
            note: format!("{} {}", config.note_prefix(), config.credit_note_suffix()),
            ..base
        });

        let journal = Journal { rows };
        debug_assert_eq!(journal.debit_total(), journal.credit_total());
        info!(
            "journal generated: {} debit rows, total {}",
            journal.debit_rows().count(),
            journal.credit_total()
        );

        journal
    }

    /// Replaces the document id on every row, both sides.
    pub fn stamp_document(&mut self, document_id: &str) {
        debug!("stamping document id {} on {} rows", document_id, self.rows.len());
        for row in self.rows.iter_mut() {
            row.document_id = document_id.to_string();
        }
    }

    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn debit_rows(&self) -> impl Iterator<Item = &LedgerRow> {
        self.rows.iter().filter(|r| r.side == Side::Debit)
    }

    pub fn credit_rows(&self) -> impl Iterator<Item = &LedgerRow> {
        self.rows.iter().filter(|r| r.side == Side::Credit)
    }

    pub fn debit_total(&self) -> Decimal {
        self.debit_rows().map(|r| r.amount).sum()
    }

    pub fn credit_total(&self) -> Decimal {
        self.credit_rows().map(|r| r.amount).sum()
    }
}
