use anyhow::Result;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::ledger::*;
use super::mapping::{map_records, MappedRecord, MappingEntry, MappingTable};
use super::schema::NormalizedRecord;
use crate::config::CompanyConfig;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 27).unwrap()
}

fn config() -> CompanyConfig {
    CompanyConfig::korea_rental().with_note_prefix("PC 렌탈료")
}

fn mapped(rows: &[(&str, Decimal)]) -> Result<Vec<MappedRecord>> {
    let table = MappingTable::from_entries(vec![
        MappingEntry::new("팀A", "A팀", "53000-1", "100"),
        MappingEntry::new("팀B", "B팀", "53000-2", "ABC"),
    ]);
    let records = rows
        .iter()
        .map(|(team, amount)| NormalizedRecord {
            model_name: None,
            sales_category: None,
            managing_dept: None,
            partner_name: None,
            managing_branch: None,
            amount: *amount,
            source_team_name: team.to_string(),
        })
        .collect();

    Ok(map_records(records, &table, &config())?.resolved)
}

#[test]
fn test_document_id() {
    assert_eq!(document_id(date(), "00616"), "FI20250427616");
    assert_eq!(document_id(date(), "7"), "FI202504277");
}

#[test]
fn test_journal_is_balanced() -> Result<()> {
    let records = mapped(&[("팀A", dec!(10000)), ("팀B", dec!(25500)), ("팀A", dec!(3000))])?;
    let journal = Journal::generate(&records, &config(), "00616", date());

    assert_eq!(journal.len(), records.len() + 1);
    assert_eq!(journal.debit_rows().count(), 3);
    assert_eq!(journal.credit_rows().count(), 1);
    assert_eq!(journal.debit_total(), dec!(38500));
    assert_eq!(journal.credit_total(), journal.debit_total());

    Ok(())
}

#[test]
fn test_debit_rows() -> Result<()> {
    let records = mapped(&[("팀A", dec!(10000)), ("팀B", dec!(25500))])?;
    let journal = Journal::generate(&records, &config(), "00616", date());
    let rows = journal.rows();

    let line_numbers: Vec<usize> = rows.iter().map(|r| r.line_no).collect();
    assert_eq!(line_numbers, vec![1, 2, 3]);

    let first = &rows[0];
    assert_eq!(first.side, Side::Debit);
    assert_eq!(first.document_id, "FI20250427616");
    assert_eq!(first.account_code, "53000-1");
    assert_eq!(first.note, "PC 렌탈료(A팀)");
    assert_eq!(first.project_code, Some(100));
    assert_eq!(first.value("AMT").as_deref(), Some("10000"));
    assert_eq!(first.value("TP_DRCR").as_deref(), Some("1"));
    assert_eq!(first.value("CD_CC").as_deref(), Some("5020"));
    assert_eq!(first.value("CD_DEPT").as_deref(), Some("1010"));
    assert_eq!(first.value("CD_PARTNER").as_deref(), Some("101388"));
    assert_eq!(first.value("ID_WRITE").as_deref(), Some("00616"));
    assert_eq!(first.value("DT_ACCT").as_deref(), Some("20250427"));
    assert_eq!(first.value("NO_TAX").as_deref(), Some("*"));

    // unparseable project code falls back to the default
    assert_eq!(rows[1].project_code, Some(1000));

    Ok(())
}

#[test]
fn test_credit_row() -> Result<()> {
    let records = mapped(&[("팀A", dec!(1234500)), ("팀B", dec!(500))])?;
    let journal = Journal::generate(&records, &config(), "00616", date());
    let credit = journal.rows().last().unwrap();

    assert_eq!(credit.side, Side::Credit);
    assert_eq!(credit.line_no, 3);
    assert_eq!(credit.account_code, "25300");
    assert_eq!(credit.amount, dec!(1235000));
    assert_eq!(credit.note, "PC 렌탈료 미지급금");
    assert_eq!(credit.project_code, None);
    assert_eq!(credit.value("AMT").as_deref(), Some("1235000"));
    assert_eq!(credit.value("CD_PJT").as_deref(), Some(""));
    assert_eq!(credit.value("CD_CC").as_deref(), Some("5020"));
    assert_eq!(credit.value("TP_DRCR").as_deref(), Some("2"));

    Ok(())
}

#[test]
fn test_stamp_document_covers_every_row() -> Result<()> {
    let records = mapped(&[("팀A", dec!(10000)), ("팀B", dec!(20000))])?;
    let mut journal = Journal::generate(&records, &config(), "00616", date());

    journal.stamp_document("20250427001");

    for row in journal.rows() {
        assert_eq!(row.value("NO_DOCU").as_deref(), Some("20250427001"));
        assert_eq!(row.value("ROW_ID").as_deref(), Some("20250427001"));
    }

    Ok(())
}

#[test]
fn test_unknown_column_has_no_value() -> Result<()> {
    let records = mapped(&[("팀A", dec!(10000))])?;
    let journal = Journal::generate(&records, &config(), "00616", date());

    assert_eq!(journal.rows()[0].value("NM_BIGO"), None);
    assert_eq!(
        journal.rows()[0].to_record(&["CD_ACCT", "NM_BIGO", "AMT"]),
        vec!["53000-1".to_string(), String::new(), "10000".to_string()]
    );

    Ok(())
}
