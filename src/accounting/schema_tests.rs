use anyhow::{bail, Result};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

use super::schema::*;
use super::table::{clean_headers, RawTable};
use super::{AccountingError, ColumnStrategy};
use crate::config::SchemaConfig;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
    RawTable::new(strings(headers), rows.iter().map(|r| strings(r)).collect())
}

#[test]
fn test_clean_headers_trims_and_suffixes_duplicates() {
    let cleaned = clean_headers(strings(&[" 모델명 ", "금액", "금액 ", " 금액"]));
    assert_eq!(cleaned, strings(&["모델명", "금액", "금액_1", "금액_2"]));
}

#[test]
fn test_clean_headers_skips_taken_suffix() {
    let cleaned = clean_headers(strings(&["A", "A", "A_1"]));
    assert_eq!(cleaned, strings(&["A", "A_2", "A_1"]));

    // same input, same names
    assert_eq!(clean_headers(strings(&["A", "A", "A_1"])), cleaned);
}

#[test]
fn test_amount_exact_name_wins_over_pattern() -> Result<()> {
    let headers = strings(&["4월렌탈료", "3월렌탈료"]);
    let (idx, strategy) = discover_amount_column(&headers, &SchemaConfig::default())?;

    assert_eq!(idx, 1);
    assert_eq!(strategy, "exact name '3월렌탈료'");

    Ok(())
}

#[test]
fn test_amount_month_pattern() -> Result<()> {
    let headers = strings(&["모델명", "렌탈료 비고", "12월렌탈료"]);
    let (idx, strategy) = discover_amount_column(&headers, &SchemaConfig::with_fields("5월렌탈료", &[]))?;

    assert_eq!(idx, 2);
    assert_eq!(strategy, "pattern '<N>월렌탈료'");

    Ok(())
}

#[test]
fn test_amount_month_pattern_rejects_three_digits() -> Result<()> {
    let headers = strings(&["123월렌탈료"]);
    let (idx, strategy) = discover_amount_column(&headers, &SchemaConfig::with_fields("없음", &[]))?;

    // still found, but only through the substring fallback
    assert_eq!(idx, 0);
    assert_eq!(strategy, "name containing 렌탈료");

    Ok(())
}

#[test]
fn test_amount_month_pattern_ascii_digits_only() -> Result<()> {
    // Arabic-Indic three
    let headers = strings(&["٣월렌탈료"]);
    let (idx, strategy) = discover_amount_column(&headers, &SchemaConfig::with_fields("없음", &[]))?;

    assert_eq!(idx, 0);
    assert_eq!(strategy, "name containing 렌탈료");
    assert!(MonthPattern::new("월", "렌탈료", false).matches(&headers).is_empty());

    Ok(())
}

#[test]
fn test_amount_currency_marker() -> Result<()> {
    let headers = strings(&["모델명", "청구액(원)"]);
    let (idx, _) = discover_amount_column(&headers, &SchemaConfig::with_fields("없음", &[]))?;

    assert_eq!(idx, 1);

    Ok(())
}

#[test]
fn test_amount_not_found() -> Result<()> {
    let headers = strings(&["모델명", "거래처명"]);
    match discover_amount_column(&headers, &SchemaConfig::default()) {
        Err(AccountingError::Schema { field, strategies }) => {
            assert_eq!(field, "amount");
            assert!(strategies.contains("exact name '3월렌탈료'"));
            assert!(strategies.contains("(원)"));
        },
        other => bail!("amount column should not be guessed, got {:?}", other),
    }

    Ok(())
}

#[test]
fn test_team_columns_follow_configured_priority() -> Result<()> {
    let headers = strings(&["2월 PJT", "모델명", "3월 변경PJT"]);
    let columns = discover_team_columns(&headers, &SchemaConfig::default())?;

    assert_eq!(columns, vec![2, 0]);

    Ok(())
}

#[test]
fn test_team_columns_fall_back_to_changed_project_pattern() -> Result<()> {
    let headers = strings(&["모델명", "4월 변경PJT", "4월렌탈료"]);
    let columns = discover_team_columns(&headers, &SchemaConfig::with_fields("4월렌탈료", &["없음"]))?;

    assert_eq!(columns, vec![1]);

    Ok(())
}

#[test]
fn test_team_columns_not_found() -> Result<()> {
    let headers = strings(&["모델명", "3월렌탈료"]);
    if let Err(err) = discover_team_columns(&headers, &SchemaConfig::default()) {
        assert!(matches!(err, AccountingError::Schema { field: "team", .. }));
    } else {
        bail!("team column should be required");
    }

    Ok(())
}

#[test]
fn test_parse_amount() {
    assert_eq!(parse_amount("10000"), Some(dec!(10000)));
    assert_eq!(parse_amount(" 1,234,500 "), Some(dec!(1234500)));
    assert_eq!(parse_amount("1500.7"), Some(dec!(1500)));
    assert_eq!(parse_amount("0"), Some(dec!(0)));
    assert_eq!(parse_amount(""), None);
    assert_eq!(parse_amount("반납"), None);
    assert_eq!(parse_amount("-300"), None);
}

#[test]
fn test_parse_amount_rejects_out_of_range() {
    assert_eq!(parse_amount("79228162514264337593543950335"), None);
    assert_eq!(parse_amount("1e30"), None);
    assert_eq!(parse_amount("9223372036854775807"), Some(dec!(9223372036854775807)));
}

#[test]
fn test_first_present() {
    assert_eq!(first_present(["", "X"]), Some("X"));
    assert_eq!(first_present(["A", "X"]), Some("A"));
    assert_eq!(first_present([" ", ""]), None);
}

#[test]
fn test_normalize_drops_rows_without_amount() -> Result<()> {
    let input = table(
        &["모델명", " 3월렌탈료 ", "영업분류", "관리부서", "거래처명", "관리지점", "3월 변경PJT", "2월 PJT"],
        &[
            &["PC-1", "10,000", "렌탈", "운영", "본사", "서울", "팀A", "팀Z"],
            &["PC-2", "20000", "렌탈", "운영", "본사", "서울", "", "팀B"],
            &["PC-3", "", "반납", "운영", "본사", "서울", "팀A", ""],
        ],
    );

    let normalized = normalize(&input, &SchemaConfig::default())?;

    assert_eq!(normalized.records.len(), 2);
    assert_eq!(normalized.report.amount_column, "3월렌탈료");
    assert_eq!(normalized.report.team_columns, strings(&["3월 변경PJT", "2월 PJT"]));
    assert_eq!(normalized.report.total_rows, 3);
    assert_eq!(normalized.report.dropped_rows, 1);

    let first = &normalized.records[0];
    assert_eq!(first.amount, dec!(10000));
    assert_eq!(first.source_team_name, "팀A");
    assert_eq!(first.model_name.as_deref(), Some("PC-1"));
    assert_eq!(first.managing_branch.as_deref(), Some("서울"));

    assert_eq!(normalized.records[1].source_team_name, "팀B");

    Ok(())
}

#[test]
fn test_normalize_short_rows_read_blank() -> Result<()> {
    let input = table(&["3월렌탈료", "3월 변경PJT", "모델명"], &[&["5000"]]);

    let normalized = normalize(&input, &SchemaConfig::default())?;

    assert_eq!(normalized.records.len(), 1);
    assert_eq!(normalized.records[0].source_team_name, "");
    assert_eq!(normalized.records[0].model_name, None);

    Ok(())
}
