use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use getset::Getters;
use serde::Deserialize;

use crate::data::DataError;

/// Column discovery settings for one rental company's export format.
#[derive(Debug, Clone, Deserialize, Getters)]
#[getset(get = "pub")]
#[serde(default)]
pub struct SchemaConfig {
    amount_field: String,
    /// Team-name columns in priority order, the first non-blank value wins.
    team_fields: Vec<String>,
    rental_fee_term: String,
    month_token: String,
    changed_project_term: String,
    currency_markers: Vec<String>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        SchemaConfig {
            amount_field: "3월렌탈료".to_string(),
            team_fields: vec!["3월 변경PJT".to_string(), "2월 PJT".to_string()],
            rental_fee_term: "렌탈료".to_string(),
            month_token: "월".to_string(),
            changed_project_term: "변경PJT".to_string(),
            currency_markers: vec!["₩".to_string(), "(원)".to_string()],
        }
    }
}

impl SchemaConfig {
    pub fn with_fields(amount_field: &str, team_fields: &[&str]) -> SchemaConfig {
        SchemaConfig {
            amount_field: amount_field.to_string(),
            team_fields: team_fields.iter().map(|f| f.to_string()).collect(),
            ..SchemaConfig::default()
        }
    }
}

/// Fixed codes the ERP importer expects on every journal row.
#[derive(Debug, Clone, Deserialize, Getters)]
#[getset(get = "pub")]
#[serde(default)]
pub struct ErpSettings {
    document_type: String,
    approval_status: String,
    process_status: String,
    document_kind: String,
    /// 1-based data row in the output sheet; rows above it form the leading block.
    data_row_start: usize,
    default_project_code: i64,
}

impl Default for ErpSettings {
    fn default() -> Self {
        ErpSettings {
            document_type: "11".to_string(),
            approval_status: "1".to_string(),
            process_status: "N".to_string(),
            document_kind: "3".to_string(),
            data_row_start: 4,
            default_project_code: 1000,
        }
    }
}

impl ErpSettings {
    pub fn leading_rows(&self) -> usize {
        self.data_row_start.saturating_sub(1)
    }
}

#[derive(Debug, Clone, Deserialize, Getters)]
#[getset(get = "pub")]
#[serde(default)]
pub struct CompanyConfig {
    name: String,
    partner_code: String,
    cost_center: String,
    payable_account: String,
    company_code: String,
    accounting_unit: String,
    writing_department: String,
    department_code: String,
    note_prefix: String,
    credit_note_suffix: String,
    schema: SchemaConfig,
    erp: ErpSettings,
}

impl Default for CompanyConfig {
    fn default() -> Self {
        CompanyConfig::korea_rental()
    }
}

impl CompanyConfig {
    pub fn korea_rental() -> CompanyConfig {
        CompanyConfig {
            name: "한국렌탈".to_string(),
            partner_code: "101388".to_string(),
            cost_center: "5020".to_string(),
            payable_account: "25300".to_string(),
            company_code: "1200".to_string(),
            accounting_unit: "1200".to_string(),
            writing_department: "1010".to_string(),
            department_code: "1010".to_string(),
            note_prefix: "한국렌탈㈜_PC 렌탈료".to_string(),
            credit_note_suffix: "미지급금".to_string(),
            schema: SchemaConfig::default(),
            erp: ErpSettings::default(),
        }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<CompanyConfig, DataError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn with_schema(mut self, schema: SchemaConfig) -> CompanyConfig {
        self.schema = schema;
        self
    }

    pub fn with_note_prefix(mut self, note_prefix: &str) -> CompanyConfig {
        self.note_prefix = note_prefix.to_string();
        self
    }
}
