use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;

use crate::accounting::ledger::Journal;
use crate::accounting::mapping::MappingOutcome;
use crate::accounting::schema::SchemaReport;

#[derive(Debug, Clone, PartialEq)]
pub struct MappedTeam {
    pub original: String,
    pub present: String,
    pub account_code: String,
    pub project_code: String,
}

/// Diagnostics of a successful run, shown to the operator next to the output file.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub amount_column: String,
    pub amount_strategy: String,
    pub team_columns: Vec<String>,
    pub total_rows: usize,
    pub dropped_rows: usize,
    pub unresolved_rows: usize,
    pub blank_team_rows: usize,
    pub unmapped_teams: Vec<String>,
    pub mapped_teams: Vec<MappedTeam>,
    pub debit_count: usize,
    pub total_amount: Decimal,
    pub account_counts: BTreeMap<String, usize>,
    pub payable_account: String,
    pub document_id: String,
}

impl Summary {
    pub fn new(schema: &SchemaReport, mapping: &MappingOutcome, journal: &Journal) -> Summary {
        let mut mapped_teams: Vec<MappedTeam> = Vec::new();
        for record in &mapping.resolved {
            if mapped_teams.iter().any(|t| t.original == record.source.source_team_name) {
                continue;
            }
            mapped_teams.push(MappedTeam {
                original: record.source.source_team_name.clone(),
                present: record.team_name.clone(),
                account_code: record.account_code.clone(),
                project_code: record.project_code.clone(),
            });
        }

        let mut account_counts = BTreeMap::new();
        for row in journal.debit_rows() {
            *account_counts.entry(row.account_code.clone()).or_insert(0) += 1;
        }

        let credit = journal.credit_rows().next();

        Summary {
            amount_column: schema.amount_column.clone(),
            amount_strategy: schema.amount_strategy.clone(),
            team_columns: schema.team_columns.clone(),
            total_rows: schema.total_rows,
            dropped_rows: schema.dropped_rows,
            unresolved_rows: mapping.unresolved_rows,
            blank_team_rows: mapping.blank_team_rows,
            unmapped_teams: mapping.unmapped_teams.clone(),
            mapped_teams,
            debit_count: journal.debit_rows().count(),
            total_amount: journal.debit_total(),
            account_counts,
            payable_account: credit.map(|r| r.account_code.clone()).unwrap_or_default(),
            document_id: journal.rows().first().map(|r| r.document_id.clone()).unwrap_or_default(),
        }
    }
}

/// Renders a number with thousands separators, e.g. `1,234,500`.
fn grouped(amount: Decimal) -> String {
    let digits = amount.trunc().abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if amount.is_sign_negative() && !amount.is_zero() {
        out.insert(0, '-');
    }
    out
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "document: {}", self.document_id)?;
        writeln!(f, "amount column: {} ({})", self.amount_column, self.amount_strategy)?;
        writeln!(f, "team columns: {}", self.team_columns.join(", "))?;
        writeln!(
            f,
            "rows: {} read, {} dropped without amount, {} unmapped",
            self.total_rows, self.dropped_rows, self.unresolved_rows
        )?;
        writeln!(f, "entries: {} ({} debit, 1 credit)", self.debit_count + 1, self.debit_count)?;
        writeln!(f, "total amount: {}원", grouped(self.total_amount))?;
        writeln!(
            f,
            "accounts: {} debit, credit {} (미지급금)",
            self.account_counts.len(),
            self.payable_account
        )?;
        for (account, count) in &self.account_counts {
            writeln!(f, "  {}: {}", account, count)?;
        }

        writeln!(f, "mapped teams:")?;
        for team in &self.mapped_teams {
            writeln!(
                f,
                "  {} -> {} (ACCT: {}, PJT: {})",
                team.original, team.present, team.account_code, team.project_code
            )?;
        }

        if !self.unmapped_teams.is_empty() {
            writeln!(f, "unmapped teams: {}", self.unmapped_teams.join(", "))?;
        }
        if self.blank_team_rows > 0 {
            writeln!(f, "rows without team name: {}", self.blank_team_rows)?;
        }

        Ok(())
    }
}
