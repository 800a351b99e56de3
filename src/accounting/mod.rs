use enum_dispatch::enum_dispatch;
use thiserror::Error;

pub mod ledger;
pub mod mapping;
pub mod schema;
pub mod table;
pub mod template;

use schema::{Contains, ExactName, MonthPattern, Strategy};

#[cfg(test)]
mod ledger_tests;
#[cfg(test)]
mod schema_tests;
#[cfg(test)]
mod template_tests;

#[derive(Debug, PartialEq, Error)]
pub enum AccountingError {
    #[error("{field} field not found (tried: {strategies})")]
    Schema { field: &'static str, strategies: String },
    #[error("no records could be mapped (unmapped teams: {})", .unmapped.join(", "))]
    Mapping { unmapped: Vec<String> },
    #[error("{0} is required")]
    Validation(&'static str),
}

/// One way of locating a column among the cleaned header names.
#[enum_dispatch]
pub trait ColumnStrategy {
    /// Indexes of every matching header, in header order.
    fn matches(&self, headers: &[String]) -> Vec<usize>;

    fn describe(&self) -> String;
}
