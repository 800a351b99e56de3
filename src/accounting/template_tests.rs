use anyhow::Result;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

use super::ledger::{Journal, ERP_COLUMNS, GENERATED_COLUMNS};
use super::mapping::{map_records, MappingEntry, MappingTable};
use super::schema::NormalizedRecord;
use super::template::*;
use crate::config::{CompanyConfig, ErpSettings};

fn journal() -> Result<Journal> {
    let config = CompanyConfig::korea_rental();
    let table = MappingTable::from_entries(vec![MappingEntry::new("팀A", "A팀", "53000", "100")]);
    let records = [dec!(1000), dec!(2000), dec!(3000)]
        .into_iter()
        .map(|amount| NormalizedRecord {
            model_name: None,
            sales_category: None,
            managing_dept: None,
            partner_name: None,
            managing_branch: None,
            amount,
            source_team_name: "팀A".to_string(),
        })
        .collect();

    let outcome = map_records(records, &table, &config)?;
    let date = NaiveDate::from_ymd_opt(2025, 4, 27).unwrap();
    Ok(Journal::generate(&outcome.resolved, &config, "00616", date))
}

fn template(columns: &[&str], leading: usize) -> Template {
    let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    let rows = (0..leading)
        .map(|n| columns.iter().map(|c| format!("{}-{}", c, n)).collect())
        .collect();
    Template::new(columns, rows)
}

#[test]
fn test_without_template() -> Result<()> {
    let journal = journal()?;
    let output = reconcile(&journal, None, &ErpSettings::default());

    assert_eq!(output.columns().len(), GENERATED_COLUMNS.len());
    assert_eq!(output.leading_rows().len(), 3);
    assert!(output.leading_rows().iter().flatten().all(|c| c.is_empty()));
    assert_eq!(output.data_rows().len(), journal.len());
    assert_eq!(output.data_rows()[0], journal.rows()[0].to_record(GENERATED_COLUMNS));

    Ok(())
}

#[test]
fn test_leading_block_is_padded_or_truncated() -> Result<()> {
    let journal = journal()?;
    let columns = ["NO_DOCU", "ROW_NO", "AMT"];
    let expected: Vec<Vec<String>> = journal.rows().iter().map(|r| r.to_record(&columns)).collect();

    for leading in [0, 2, 3, 5] {
        let template = template(&columns, leading);
        let output = reconcile(&journal, Some(&template), &ErpSettings::default());

        assert_eq!(output.rows().len(), 3 + journal.len());
        assert_eq!(output.data_rows(), expected.as_slice());

        let kept = leading.min(3);
        assert_eq!(&output.leading_rows()[..kept], &template.leading_rows()[..kept]);
        assert!(output.leading_rows()[kept..].iter().flatten().all(|c| c.is_empty()));
    }

    Ok(())
}

#[test]
fn test_template_columns_are_authoritative() -> Result<()> {
    let journal = journal()?;
    let template = template(&["AMT", "메모", "CD_ACCT"], 1);
    let output = reconcile(&journal, Some(&template), &ErpSettings::default());

    assert_eq!(output.columns(), ["AMT", "메모", "CD_ACCT"].map(String::from).as_slice());
    assert_eq!(output.column_values("메모"), Some(vec!["", "", "", ""]));
    assert_eq!(output.column_values("AMT"), Some(vec!["1000", "2000", "3000", "6000"]));
    assert_eq!(output.column_values("CD_CC"), None);

    Ok(())
}

#[test]
fn test_line_order_is_kept() -> Result<()> {
    let journal = journal()?;
    let output = reconcile(&journal, Some(&Template::erp_standard()), &ErpSettings::default());

    assert_eq!(output.column_values("ROW_NO"), Some(vec!["1", "2", "3", "4"]));
    assert_eq!(output.column_values("TP_DRCR"), Some(vec!["1", "1", "1", "2"]));

    Ok(())
}

#[test]
fn test_erp_standard_layout() {
    let template = Template::erp_standard();

    assert_eq!(template.columns().len(), 136);
    assert_eq!(template.columns()[0], ERP_COLUMNS[0]);
    assert!(template.leading_rows().is_empty());
}

#[test]
fn test_template_rows_fit_column_count() {
    let template = Template::new(
        vec!["A".to_string(), "B".to_string()],
        vec![vec!["1".to_string()], vec!["1".to_string(), "2".to_string(), "3".to_string()]],
    );

    assert_eq!(template.leading_rows()[0], vec!["1".to_string(), String::new()]);
    assert_eq!(template.leading_rows()[1], vec!["1".to_string(), "2".to_string()]);
}
