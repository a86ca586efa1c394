//! Per-day summary returned by `Environment::next_day`.

use crate::{record::CustomerDayRecord, types::Day};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayReport {
    pub date:          NaiveDate,
    /// Days elapsed since the epoch.
    pub day:           Day,
    pub new_customers: usize,
    /// Customers carried over from the previous day.
    pub continued:     usize,
    /// Previous-day customers dropped because they paid off.
    pub terminated:    usize,
    /// Total rows in history after the append.
    pub history_rows:  usize,
    pub total_payment: f64,
    pub total_debt:    f64,
}

impl DayReport {
    pub(crate) fn totals(rows: &[CustomerDayRecord]) -> (f64, f64) {
        rows.iter()
            .fold((0.0, 0.0), |(paid, owed), r| (paid + r.payment, owed + r.debt))
    }
}
