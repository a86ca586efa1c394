//! The collection environment — simulated clock plus full history.
//!
//! ONE STEP (`next_day`), in this order:
//!   1. today = current date + 1
//!   2. n ~ Poisson(arrivals.daily_mean) new customers for today
//!   3. yesterday's rows with debt >= payment continue
//!   4. the pipeline turns them into today's rows
//!   5. continuing rows, then new rows, are appended to history
//!   6. the clock moves to today
//!
//! RULES:
//!   - All randomness flows through the StreamSet built from one seed.
//!   - History is append-only; terminated customers are never revisited.

use crate::{
    clock::SimClock,
    config::SimConfig,
    error::SimResult,
    history::History,
    onboarding::Onboarding,
    pipeline::Pipeline,
    report::DayReport,
    rng::{RngBank, StreamSet},
    types::Day,
};
use chrono::NaiveDate;

/// Seed used by `Environment::default()`.
pub const DEFAULT_SEED: u64 = 42;

pub struct Environment {
    clock:      SimClock,
    config:     SimConfig,
    seed:       u64,
    streams:    StreamSet,
    onboarding: Onboarding,
    pipeline:   Pipeline,
    history:    History,
}

impl Environment {
    /// Default scenario, every stream seeded from `seed`.
    pub fn new(seed: u64) -> Self {
        Self::with_config(SimConfig::default(), seed)
    }

    pub fn with_config(config: SimConfig, seed: u64) -> Self {
        let streams = RngBank::new(seed).stream_set();
        Self::with_samplers(config, streams)
    }

    /// Build with explicit samplers, e.g. `MeanSampler` for closed-form days.
    /// The reported seed is the one the stream set was derived from.
    pub fn with_samplers(config: SimConfig, mut streams: StreamSet) -> Self {
        let seed = streams.seed;
        let bootstrap = Onboarding::bootstrap(&config.bootstrap, config.epoch, &mut streams.identity);
        log::debug!("environment: seed={seed} epoch={} bootstrap={}", config.epoch, bootstrap.id);
        Self {
            clock:      SimClock::new(config.epoch),
            onboarding: Onboarding::new(config.onboarding.clone()),
            pipeline:   Pipeline::from_config(&config.dynamics),
            history:    History::new(bootstrap),
            streams,
            config,
            seed,
        }
    }

    /// Advance one simulated day.
    pub fn next_day(&mut self) -> SimResult<DayReport> {
        let yesterday = self.clock.date;
        let today = self.clock.next_date()?;

        let n_new = self.streams.arrivals.poisson(self.config.arrivals.daily_mean)? as usize;
        let new_customers = self.onboarding.generate(
            today,
            n_new,
            &mut *self.streams.onboarding,
            &mut self.streams.identity,
        )?;

        let previous = self.history.on(yesterday).len();
        let continuing = self.history.continuing_on(yesterday);
        let terminated = previous - continuing.len();

        let updated = self.pipeline.run(&continuing, today, &mut *self.streams.dynamics)?;
        let continued = updated.len();

        let range = self.history.append_day(today, updated.into_iter().chain(new_customers));
        let (total_payment, total_debt) = DayReport::totals(&self.history.rows()[range]);
        self.clock.advance()?;

        let report = DayReport {
            date: today,
            day: self.clock.day,
            new_customers: n_new,
            continued,
            terminated,
            history_rows: self.history.len(),
            total_payment,
            total_debt,
        };
        log::info!(
            "{today} environment: new={} continued={} terminated={} rows={}",
            report.new_customers,
            report.continued,
            report.terminated,
            report.history_rows
        );
        Ok(report)
    }

    /// Run n days in a loop.
    pub fn run_days(&mut self, n: Day) -> SimResult<Vec<DayReport>> {
        (0..n).map(|_| self.next_day()).collect()
    }

    pub fn date(&self) -> NaiveDate {
        self.clock.date
    }

    /// Days simulated since the epoch.
    pub fn day(&self) -> Day {
        self.clock.day
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for Environment {
    fn default() -> Self { Self::new(DEFAULT_SEED) }
}
