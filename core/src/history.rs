//! Append-only customer-day table.
//!
//! RULE: Rows are never removed or edited. Each simulated day appends
//! one contiguous block, so a date maps to a range of row indices.

use crate::{record::CustomerDayRecord, types::CustomerId};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use std::ops::Range;

#[derive(Debug, Clone)]
pub struct History {
    rows: Vec<CustomerDayRecord>,
    days: BTreeMap<NaiveDate, Range<usize>>,
}

impl History {
    /// Start a history from its bootstrap row.
    pub fn new(bootstrap: CustomerDayRecord) -> Self {
        let date = bootstrap.date;
        let mut days = BTreeMap::new();
        days.insert(date, 0..1);
        Self {
            rows: vec![bootstrap],
            days,
        }
    }

    /// Append the block of rows for `date`.
    ///
    /// Panics if `date` is not after the last appended day or if any row
    /// carries a different date. Both mean the caller merged the wrong tables.
    pub fn append_day<I>(&mut self, date: NaiveDate, rows: I) -> Range<usize>
    where
        I: IntoIterator<Item = CustomerDayRecord>,
    {
        if let Some(last) = self.last_date() {
            assert!(date > last, "append_day({date}) after {last}: history is append-only");
        }
        let start = self.rows.len();
        for row in rows {
            assert_eq!(row.date, date, "row for customer {} is dated {} in block {date}", row.id, row.date);
            self.rows.push(row);
        }
        let range = start..self.rows.len();
        self.days.insert(date, range.clone());
        range
    }

    pub fn rows(&self) -> &[CustomerDayRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.keys().next_back().copied()
    }

    /// All rows dated `date`; empty if the day was never simulated.
    pub fn on(&self, date: NaiveDate) -> &[CustomerDayRecord] {
        match self.days.get(&date) {
            Some(range) => &self.rows[range.clone()],
            None => &[],
        }
    }

    /// Rows dated `date` whose customers are carried into the next day.
    pub fn continuing_on(&self, date: NaiveDate) -> Vec<CustomerDayRecord> {
        self.on(date)
            .iter()
            .filter(|r| r.carries_forward())
            .cloned()
            .collect()
    }

    /// Every row of one customer, oldest first.
    pub fn customer_thread(&self, id: CustomerId) -> Vec<&CustomerDayRecord> {
        self.rows.iter().filter(|r| r.id == id).collect()
    }

    /// Number of distinct customers ever seen.
    pub fn customer_count(&self) -> usize {
        self.rows.iter().map(|r| r.id).collect::<HashSet<_>>().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2016, 1, d).unwrap()
    }

    fn row(tag: u8, date: NaiveDate, debt: f64, payment: f64) -> CustomerDayRecord {
        CustomerDayRecord {
            id: CustomerId::from_random_bytes([tag; 16]),
            date,
            initial_debt: 100.0,
            debt,
            days_late: 1,
            payment,
            age: 7000,
            discount: 0.0,
            interest: 0.0,
            action: None,
            financial_educ: 40.0,
        }
    }

    #[test]
    fn days_map_to_contiguous_blocks() {
        let mut history = History::new(row(0, day(1), 100.0, 0.0));
        history.append_day(day(2), vec![row(0, day(2), 90.0, 10.0), row(1, day(2), 50.0, 0.0)]);
        history.append_day(day(3), Vec::new());

        assert_eq!(history.len(), 3);
        assert_eq!(history.on(day(1)).len(), 1);
        assert_eq!(history.on(day(2)).len(), 2);
        assert!(history.on(day(3)).is_empty());
        assert!(history.on(day(9)).is_empty());
        assert_eq!(history.last_date(), Some(day(3)));
        assert_eq!(history.customer_count(), 2);
        assert_eq!(history.customer_thread(CustomerId::from_random_bytes([0; 16])).len(), 2);
    }

    #[test]
    fn continuing_excludes_overpaid_rows() {
        let mut history = History::new(row(0, day(1), 100.0, 0.0));
        history.append_day(
            day(2),
            vec![row(1, day(2), 5.0, 6.0), row(2, day(2), 6.0, 6.0), row(3, day(2), 7.0, 6.0)],
        );
        let continuing = history.continuing_on(day(2));
        assert_eq!(continuing.len(), 2, "debt == payment still continues");
    }

    #[test]
    #[should_panic(expected = "history is append-only")]
    fn appending_an_old_day_panics() {
        let mut history = History::new(row(0, day(5), 100.0, 0.0));
        history.append_day(day(4), Vec::new());
    }

    #[test]
    #[should_panic(expected = "in block")]
    fn misdated_row_panics() {
        let mut history = History::new(row(0, day(1), 100.0, 0.0));
        history.append_day(day(2), vec![row(1, day(3), 1.0, 0.0)]);
    }
}
