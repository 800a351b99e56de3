use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use log::{debug, info, warn};
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::table::{cell, RawTable};
use super::{AccountingError, ColumnStrategy};
use crate::config::SchemaConfig;

pub const MODEL_NAME: &str = "모델명";
pub const SALES_CATEGORY: &str = "영업분류";
pub const MANAGING_DEPT: &str = "관리부서";
pub const PARTNER_NAME: &str = "거래처명";
pub const MANAGING_BRANCH: &str = "관리지점";

pub struct ExactName {
    name: String,
}

impl ExactName {
    pub fn new(name: &str) -> ExactName {
        ExactName { name: name.trim().to_string() }
    }
}

impl ColumnStrategy for ExactName {
    fn matches(&self, headers: &[String]) -> Vec<usize> {
        positions(headers, |h| h.trim() == self.name)
    }

    fn describe(&self) -> String {
        format!("exact name '{}'", self.name)
    }
}

/// `<1-2 digit month><month token><term>`, e.g. `3월렌탈료`.
pub struct MonthPattern {
    regex: Option<Regex>,
    label: String,
}

impl MonthPattern {
    pub fn new(month_token: &str, term: &str, spaced: bool) -> MonthPattern {
        let gap = if spaced { r"\s?" } else { "" };
        let pattern = format!(
            r"^\s?[0-9]{{1,2}}{}{}{}\s?$",
            regex::escape(month_token),
            gap,
            regex::escape(term)
        );
        let regex = match Regex::new(&pattern) {
            Ok(regex) => Some(regex),
            Err(err) => {
                warn!("unusable column pattern, pattern={}, err={}", pattern, err);
                None
            },
        };

        MonthPattern {
            regex,
            label: format!("pattern '<N>{}{}'", month_token, term),
        }
    }
}

impl ColumnStrategy for MonthPattern {
    fn matches(&self, headers: &[String]) -> Vec<usize> {
        match &self.regex {
            Some(regex) => positions(headers, |h| regex.is_match(h)),
            None => Vec::new(),
        }
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

pub struct Contains {
    needles: Vec<String>,
}

impl Contains {
    pub fn new(needles: &[String]) -> Contains {
        Contains {
            needles: needles.iter().filter(|n| !n.is_empty()).cloned().collect(),
        }
    }
}

impl ColumnStrategy for Contains {
    fn matches(&self, headers: &[String]) -> Vec<usize> {
        positions(headers, |h| self.needles.iter().any(|n| h.contains(n.as_str())))
    }

    fn describe(&self) -> String {
        format!("name containing {}", self.needles.join(" or "))
    }
}

#[enum_dispatch(ColumnStrategy)]
pub enum Strategy {
    ExactName,
    MonthPattern,
    Contains,
}

fn positions<F: Fn(&str) -> bool>(headers: &[String], predicate: F) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .filter(|(_, h)| predicate(h))
        .map(|(idx, _)| idx)
        .collect()
}

pub fn amount_strategies(config: &SchemaConfig) -> Vec<Strategy> {
    vec![
        ExactName::new(config.amount_field()).into(),
        MonthPattern::new(config.month_token(), config.rental_fee_term(), false).into(),
        Contains::new(std::slice::from_ref(config.rental_fee_term())).into(),
        Contains::new(config.currency_markers()).into(),
    ]
}

/// Configured team fields, one strategy each so priority order is kept,
/// followed by the month + changed-project naming pattern.
pub fn team_strategies(config: &SchemaConfig) -> (Vec<Strategy>, Strategy) {
    let configured: Vec<Strategy> = config.team_fields().iter().map(|f| ExactName::new(f).into()).collect();
    let fallback: Strategy = MonthPattern::new(config.month_token(), config.changed_project_term(), true).into();
    (configured, fallback)
}

fn describe_all(strategies: &[&Strategy]) -> String {
    strategies.iter().map(|s| s.describe()).collect::<Vec<_>>().join("; ")
}

/// Returns the amount column index and the strategy that found it.
pub fn discover_amount_column(headers: &[String], config: &SchemaConfig) -> Result<(usize, String), AccountingError> {
    let strategies = amount_strategies(config);
    for strategy in &strategies {
        if let Some(&idx) = strategy.matches(headers).first() {
            return Ok((idx, strategy.describe()));
        }
    }

    Err(AccountingError::Schema {
        field: "amount",
        strategies: describe_all(&strategies.iter().collect::<Vec<_>>()),
    })
}

/// Returns the team column indexes in priority order.
pub fn discover_team_columns(headers: &[String], config: &SchemaConfig) -> Result<Vec<usize>, AccountingError> {
    let (configured, fallback) = team_strategies(config);

    let mut columns: Vec<usize> = Vec::new();
    for strategy in &configured {
        for idx in strategy.matches(headers) {
            if !columns.contains(&idx) {
                columns.push(idx);
            }
        }
    }
    if columns.is_empty() {
        columns = fallback.matches(headers);
    }

    if columns.is_empty() {
        let mut tried: Vec<&Strategy> = configured.iter().collect();
        tried.push(&fallback);
        return Err(AccountingError::Schema {
            field: "team",
            strategies: describe_all(&tried),
        });
    }

    Ok(columns)
}

/// Coerces amount text to a non-negative whole number.
///
/// Thousands separators are ignored and fractions truncate toward zero.
/// Blank, non-numeric, negative and out-of-range (beyond `i64`) values
/// yield `None`.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }

    let value = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()?
        .trunc();

    if value.is_sign_negative() && !value.is_zero() {
        return None;
    }

    // keeps any realistic batch total inside Decimal range
    let amount = value.abs();
    if amount.to_i64().is_none() {
        return None;
    }

    Some(amount)
}

/// First non-blank value in priority order.
pub fn first_present<'a, I>(values: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    values.into_iter().map(str::trim).find(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub model_name: Option<String>,
    pub sales_category: Option<String>,
    pub managing_dept: Option<String>,
    pub partner_name: Option<String>,
    pub managing_branch: Option<String>,
    pub amount: Decimal,
    /// Empty when every team column is blank for this row.
    pub source_team_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaReport {
    pub amount_column: String,
    pub amount_strategy: String,
    pub team_columns: Vec<String>,
    pub total_rows: usize,
    pub dropped_rows: usize,
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub records: Vec<NormalizedRecord>,
    pub report: SchemaReport,
}

pub fn normalize(table: &RawTable, config: &SchemaConfig) -> Result<Normalized, AccountingError> {
    let headers = table.headers();
    let (amount_idx, amount_strategy) = discover_amount_column(headers, config)?;
    let team_idxs = discover_team_columns(headers, config)?;

    let team_columns: Vec<String> = team_idxs.iter().map(|&idx| headers[idx].clone()).collect();
    info!(
        "amount column '{}' ({}), team columns [{}]",
        headers[amount_idx],
        amount_strategy,
        team_columns.join(", ")
    );

    let pass_through = |row: &[String], name: &str| -> Option<String> {
        let idx = table.column_index(name)?;
        let value = cell(row, idx).trim();
        (!value.is_empty()).then(|| value.to_string())
    };

    let mut records = Vec::with_capacity(table.len());
    let mut dropped_rows = 0;
    for (line, row) in table.rows().iter().enumerate() {
        let Some(amount) = parse_amount(cell(row, amount_idx)) else {
            debug!("dropping row without chargeable amount, row={}, value={:?}", line + 1, cell(row, amount_idx));
            dropped_rows += 1;
            continue;
        };

        let source_team_name = first_present(team_idxs.iter().map(|&idx| cell(row, idx)))
            .unwrap_or_default()
            .to_string();

        records.push(NormalizedRecord {
            model_name: pass_through(row, MODEL_NAME),
            sales_category: pass_through(row, SALES_CATEGORY),
            managing_dept: pass_through(row, MANAGING_DEPT),
            partner_name: pass_through(row, PARTNER_NAME),
            managing_branch: pass_through(row, MANAGING_BRANCH),
            amount,
            source_team_name,
        });
    }

    if dropped_rows > 0 {
        info!("{} of {} rows dropped for missing amount (returns/cancellations)", dropped_rows, table.len());
    }
    if records.is_empty() && !table.is_empty() {
        warn!("every row was dropped for missing amount");
    }

    Ok(Normalized {
        records,
        report: SchemaReport {
            amount_column: headers[amount_idx].clone(),
            amount_strategy,
            team_columns,
            total_rows: table.len(),
            dropped_rows,
        },
    })
}
