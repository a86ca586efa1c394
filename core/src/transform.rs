//! Transform trait — one stage of the per-day update.
//!
//! RULE: A transform maps yesterday-shaped rows to today-shaped rows.
//! It must return the same number of rows, in the same order, with the
//! same customer ids. The pipeline checks this after every stage.

use crate::{
    error::SimResult,
    record::CustomerDayRecord,
    sampler::Sampler,
};
use chrono::NaiveDate;

/// What every stage may read besides the rows it transforms.
pub struct DayContext<'a> {
    pub today:     NaiveDate,
    /// The continuing customers' rows as they stood before the first stage.
    pub yesterday: &'a [CustomerDayRecord],
}

pub trait Transform: Send {
    /// Unique stable name for this stage.
    fn name(&self) -> &'static str;

    /// Called once per day by the pipeline, in composition order.
    fn apply(
        &self,
        rows: Vec<CustomerDayRecord>,
        ctx: &DayContext<'_>,
        rng: &mut dyn Sampler,
    ) -> SimResult<Vec<CustomerDayRecord>>;
}
