//! Bank statement CSV parsing.
//!
//! Expected header: `accountNumber,amount,date` with ISO dates.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::payments_model::BankStatementLineError;
use crate::errors::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct BankStatementLine {
    /// 1-based line number in the file, header included.
    pub line: usize,
    pub account_number: String,
    pub amount: Decimal,
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLine {
    account_number: String,
    amount: String,
    date: String,
}

/// Parses a statement into valid lines and per-line errors.
///
/// Fails as a whole only when the header is unreadable.
pub fn parse_bank_statement(
    content: &str,
) -> Result<(Vec<BankStatementLine>, Vec<BankStatementLineError>)> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    reader.headers()?;

    let mut lines = Vec::new();
    let mut errors = Vec::new();
    for (index, record) in reader.deserialize::<RawLine>().enumerate() {
        let line = index + 2;
        match record.map_err(|e| e.to_string()).and_then(parse_raw) {
            Ok((account_number, amount, date)) => lines.push(BankStatementLine {
                line,
                account_number,
                amount,
                date,
            }),
            Err(message) => errors.push(BankStatementLineError { line, message }),
        }
    }
    Ok((lines, errors))
}

fn parse_raw(raw: RawLine) -> std::result::Result<(String, Decimal, NaiveDate), String> {
    if raw.account_number.is_empty() {
        return Err("missing account number".to_string());
    }
    let amount = Decimal::from_str(&raw.amount)
        .map_err(|_| format!("invalid amount '{}'", raw.amount))?;
    if amount <= Decimal::ZERO {
        return Err(format!("amount must be positive, got {}", amount));
    }
    let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}'", raw.date))?;
    Ok((raw.account_number, amount, date))
}
