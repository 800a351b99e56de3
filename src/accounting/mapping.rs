use std::collections::HashMap;
use std::str::FromStr;

use getset::Getters;
use log::{info, warn};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use super::schema::NormalizedRecord;
use super::AccountingError;
use crate::config::CompanyConfig;

/// One row of the user-maintained team translation table.
#[derive(Debug, Clone, PartialEq, Deserialize, Getters)]
#[getset(get = "pub")]
pub struct MappingEntry {
    #[serde(deserialize_with = "code_text")]
    past: String,
    #[serde(deserialize_with = "code_text")]
    present: String,
    #[serde(rename = "CD_ACCT", deserialize_with = "code_text")]
    account_code: String,
    #[serde(rename = "CD_PJT", deserialize_with = "code_text")]
    project_code: String,
}

impl MappingEntry {
    pub fn new(past: &str, present: &str, account_code: &str, project_code: &str) -> MappingEntry {
        MappingEntry {
            past: past.to_string(),
            present: present.to_string(),
            account_code: account_code.to_string(),
            project_code: project_code.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CodeValue {
    Text(String),
    Int(i64),
    Float(f64),
}

/// Codes are typed by hand in the table, so both `"100"` and `100` are accepted.
fn code_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<CodeValue>::deserialize(deserializer)? {
        Some(CodeValue::Text(text)) => text.trim().to_string(),
        Some(CodeValue::Int(n)) => n.to_string(),
        Some(CodeValue::Float(f)) if f.fract() == 0.0 => format!("{}", f as i64),
        Some(CodeValue::Float(f)) => f.to_string(),
        None => String::new(),
    })
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Resolution {
    pub present: String,
    pub account_code: String,
    pub project_code: String,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        !self.account_code.trim().is_empty() && !self.project_code.trim().is_empty()
    }
}

/// Read-only after load; share it between conversions behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    entries: HashMap<String, MappingEntry>,
}

impl MappingTable {
    /// Later entries replace earlier ones with the same `past` name.
    pub fn from_entries<I: IntoIterator<Item = MappingEntry>>(entries: I) -> MappingTable {
        let mut table = HashMap::new();
        for entry in entries {
            if let Some(previous) = table.insert(entry.past.clone(), entry) {
                warn!("duplicate mapping entry replaced, past={}", previous.past);
            }
        }

        info!("mapping table loaded: {} entries", table.len());
        MappingTable { entries: table }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, past: &str) -> Option<&MappingEntry> {
        self.entries.get(past)
    }

    pub fn resolve(&self, team_name: &str) -> Resolution {
        let team_name = team_name.trim();
        if team_name.is_empty() {
            return Resolution::default();
        }

        match self.entries.get(team_name) {
            Some(entry) => Resolution {
                present: entry.present.clone(),
                account_code: entry.account_code.clone(),
                project_code: entry.project_code.clone(),
            },
            None => Resolution {
                present: team_name.to_string(),
                ..Resolution::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappedRecord {
    pub source: NormalizedRecord,
    pub team_name: String,
    pub account_code: String,
    pub project_code: String,
    pub note: String,
    pub cost_center_code: String,
    pub partner_code: String,
}

impl MappedRecord {
    pub fn is_resolved(&self) -> bool {
        !self.account_code.trim().is_empty() && !self.project_code.trim().is_empty()
    }

    /// Project code as the ERP expects it, or `default` when the table
    /// holds something that is not a whole number.
    pub fn project_code_number(&self, default: i64) -> i64 {
        let raw = self.project_code.trim();
        if let Ok(code) = raw.parse::<i64>() {
            return code;
        }

        match Decimal::from_str(raw).ok().and_then(|d| d.trunc().to_i64()) {
            Some(code) => code,
            None => {
                warn!(
                    "project code is not numeric, using default, team={}, code={:?}, default={}",
                    self.team_name, raw, default
                );
                default
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct MappingOutcome {
    pub resolved: Vec<MappedRecord>,
    pub unresolved_rows: usize,
    pub blank_team_rows: usize,
    /// Distinct team names without both codes, in first-seen order.
    pub unmapped_teams: Vec<String>,
}

pub fn map_records(
    records: Vec<NormalizedRecord>,
    table: &MappingTable,
    config: &CompanyConfig,
) -> Result<MappingOutcome, AccountingError> {
    let total = records.len();
    let mut resolved = Vec::with_capacity(total);
    let mut unmapped_teams: Vec<String> = Vec::new();
    let mut unresolved_rows = 0;
    let mut blank_team_rows = 0;

    for record in records {
        let resolution = table.resolve(&record.source_team_name);
        let mapped = MappedRecord {
            note: format!("{}({})", config.note_prefix(), resolution.present),
            team_name: resolution.present,
            account_code: resolution.account_code,
            project_code: resolution.project_code,
            cost_center_code: config.cost_center().clone(),
            partner_code: config.partner_code().clone(),
            source: record,
        };

        if mapped.is_resolved() {
            resolved.push(mapped);
            continue;
        }

        unresolved_rows += 1;
        if mapped.team_name.is_empty() {
            blank_team_rows += 1;
        } else if !unmapped_teams.contains(&mapped.team_name) {
            unmapped_teams.push(mapped.team_name);
        }
    }

    info!("mapped records: {} / {}", resolved.len(), total);
    if !unmapped_teams.is_empty() {
        warn!("unmapped teams: {}", unmapped_teams.join(", "));
    }
    if blank_team_rows > 0 {
        warn!("{} rows have no team name", blank_team_rows);
    }

    if resolved.is_empty() {
        return Err(AccountingError::Mapping { unmapped: unmapped_teams });
    }

    Ok(MappingOutcome {
        resolved,
        unresolved_rows,
        blank_team_rows,
        unmapped_teams,
    })
}
