//! Simulation clock — owns the simulated calendar.

use crate::{
    error::{SimError, SimResult},
    types::Day,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimClock {
    pub date:  NaiveDate,
    /// Days elapsed since the epoch.
    pub day:   Day,
}

impl SimClock {
    pub fn new(epoch: NaiveDate) -> Self {
        Self { date: epoch, day: 0 }
    }

    /// The date the next step will simulate. Does not move the clock.
    pub fn next_date(&self) -> SimResult<NaiveDate> {
        self.date
            .succ_opt()
            .ok_or(SimError::CalendarOverflow { date: self.date })
    }

    /// Advance one day. Returns the new date.
    pub fn advance(&mut self) -> SimResult<NaiveDate> {
        self.date = self.next_date()?;
        self.day += 1;
        Ok(self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_moves_one_calendar_day() {
        let epoch = NaiveDate::from_ymd_opt(2016, 2, 28).unwrap();
        let mut clock = SimClock::new(epoch);

        assert_eq!(clock.next_date().unwrap(), NaiveDate::from_ymd_opt(2016, 2, 29).unwrap());
        assert_eq!(clock.date, epoch, "next_date must not move the clock");

        clock.advance().unwrap();
        clock.advance().unwrap();
        assert_eq!(clock.date, NaiveDate::from_ymd_opt(2016, 3, 1).unwrap());
        assert_eq!(clock.day, 2);
    }

    #[test]
    fn advance_past_max_date_is_an_error() {
        let mut clock = SimClock::new(NaiveDate::MAX);
        assert!(matches!(clock.advance(), Err(SimError::CalendarOverflow { .. })));
        assert_eq!(clock.day, 0);
    }
}
