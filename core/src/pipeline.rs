//! The per-day update of continuing customers.
//!
//! EXECUTION ORDER (fixed, later stages read what earlier ones wrote):
//!   1. AdvanceClock        date, age, days_late
//!   2. AccrueInterest      interest (reads updated days_late)
//!   3. DriftFinancialEduc  financial_educ
//!   4. OfferDiscount       discount
//!   5. SimulatePayment     payment (reads updated interest and educ)
//!   6. UpdateDebt          debt (reads updated payment)
//!
//! Each stage names the fields it touches through `Amount`/`Counter`
//! selectors fixed when the pipeline is composed.

use crate::{
    config::{DynamicsConfig, InterestMode},
    error::SimResult,
    record::{Amount, Counter, CustomerDayRecord},
    sampler::Sampler,
    transform::{DayContext, Transform},
};
use chrono::NaiveDate;

pub struct Pipeline {
    stages: Vec<Box<dyn Transform>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// The collection dynamics, wired in the documented order.
    pub fn from_config(c: &DynamicsConfig) -> Self {
        let mut pipeline = Pipeline::new();
        pipeline.register(Box::new(AdvanceClock {
            age:       Counter::Age,
            days_late: Counter::DaysLate,
        }));
        pipeline.register(Box::new(AccrueInterest {
            interest:     Amount::Interest,
            debt:         Amount::Debt,
            days_late:    Counter::DaysLate,
            daily_rate:   c.daily_interest,
            cutoff_days:  c.interest_cutoff_days,
        }));
        pipeline.register(Box::new(DriftFinancialEduc {
            educ:          Amount::FinancialEduc,
            learning_rate: c.educ_learning_rate,
            target_alpha:  c.educ_target_alpha,
            target_beta:   c.educ_target_beta,
            target_scale:  c.educ_target_scale,
        }));
        pipeline.register(Box::new(OfferDiscount {
            discount:     Amount::Discount,
            probability:  c.discount_probability,
            alpha:        c.discount_alpha,
            beta:         c.discount_beta,
            max_discount: c.max_discount,
        }));
        pipeline.register(Box::new(SimulatePayment {
            payment:      Amount::Payment,
            initial_debt: Amount::InitialDebt,
            debt:         Amount::Debt,
            interest:     Amount::Interest,
            educ:         Amount::FinancialEduc,
            model: PaymentModel {
                base:            c.payment_base,
                debt_weight:     c.payment_debt_weight,
                interest_weight: c.payment_interest_weight,
                educ_weight:     c.payment_educ_weight,
                educ_pivot:      c.payment_educ_pivot,
                std_dev:         c.payment_std,
            },
        }));
        pipeline.register(Box::new(UpdateDebt {
            debt:           Amount::Debt,
            interest:       Amount::Interest,
            payment:        Amount::Payment,
            discount:       Amount::Discount,
            interest_mode:  c.interest_mode,
            apply_discount: c.apply_discount,
        }));
        pipeline
    }

    /// Append a stage. Call in execution order.
    pub fn register(&mut self, stage: Box<dyn Transform>) {
        self.stages.push(stage);
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Turn yesterday's continuing rows into today's rows.
    ///
    /// Panics if a stage changes the row count or the id order.
    pub fn run(
        &self,
        yesterday: &[CustomerDayRecord],
        today: NaiveDate,
        rng: &mut dyn Sampler,
    ) -> SimResult<Vec<CustomerDayRecord>> {
        let ctx = DayContext { today, yesterday };
        let mut rows = yesterday.to_vec();

        for stage in &self.stages {
            rows = stage.apply(rows, &ctx, rng)?;
            assert_eq!(
                rows.len(),
                yesterday.len(),
                "stage '{}' changed the row count",
                stage.name()
            );
            assert!(
                rows.iter().zip(yesterday).all(|(a, b)| a.id == b.id),
                "stage '{}' reordered or replaced customer ids",
                stage.name()
            );
            log::trace!("{today} pipeline: stage={} rows={}", stage.name(), rows.len());
        }
        Ok(rows)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::from_config(&DynamicsConfig::default())
    }
}

// ── Stages ───────────────────────────────────────────────────────────────────

/// Moves every row to today; age and days late grow by one.
pub struct AdvanceClock {
    pub age:       Counter,
    pub days_late: Counter,
}

impl Transform for AdvanceClock {
    fn name(&self) -> &'static str { "advance_clock" }

    fn apply(
        &self,
        mut rows: Vec<CustomerDayRecord>,
        ctx: &DayContext<'_>,
        _rng: &mut dyn Sampler,
    ) -> SimResult<Vec<CustomerDayRecord>> {
        for r in &mut rows {
            r.date = ctx.today;
            self.age.set(r, self.age.get(r) + 1);
            self.days_late.set(r, self.days_late.get(r) + 1);
        }
        Ok(rows)
    }
}

/// Adds `debt * daily_rate` to the running interest until the cutoff.
pub struct AccrueInterest {
    pub interest:    Amount,
    pub debt:        Amount,
    pub days_late:   Counter,
    pub daily_rate:  f64,
    pub cutoff_days: u32,
}

impl Transform for AccrueInterest {
    fn name(&self) -> &'static str { "accrue_interest" }

    fn apply(
        &self,
        mut rows: Vec<CustomerDayRecord>,
        _ctx: &DayContext<'_>,
        _rng: &mut dyn Sampler,
    ) -> SimResult<Vec<CustomerDayRecord>> {
        for r in &mut rows {
            let accrued = if self.days_late.get(r) < self.cutoff_days {
                self.debt.get(r) * self.daily_rate
            } else {
                0.0
            };
            self.interest.set(r, self.interest.get(r) + accrued);
        }
        Ok(rows)
    }
}

/// Exponential moving average toward a high Beta-distributed target.
pub struct DriftFinancialEduc {
    pub educ:          Amount,
    pub learning_rate: f64,
    pub target_alpha:  f64,
    pub target_beta:   f64,
    pub target_scale:  f64,
}

impl Transform for DriftFinancialEduc {
    fn name(&self) -> &'static str { "drift_financial_educ" }

    fn apply(
        &self,
        mut rows: Vec<CustomerDayRecord>,
        _ctx: &DayContext<'_>,
        rng: &mut dyn Sampler,
    ) -> SimResult<Vec<CustomerDayRecord>> {
        for r in &mut rows {
            let target = rng.beta(self.target_alpha, self.target_beta)? * self.target_scale;
            let educ = self.educ.get(r) * (1.0 - self.learning_rate) + target * self.learning_rate;
            self.educ.set(r, educ);
        }
        Ok(rows)
    }
}

/// Offers a Beta-sized discount to about half the rows, capped.
pub struct OfferDiscount {
    pub discount:     Amount,
    pub probability:  f64,
    pub alpha:        f64,
    pub beta:         f64,
    pub max_discount: f64,
}

impl Transform for OfferDiscount {
    fn name(&self) -> &'static str { "offer_discount" }

    fn apply(
        &self,
        mut rows: Vec<CustomerDayRecord>,
        _ctx: &DayContext<'_>,
        rng: &mut dyn Sampler,
    ) -> SimResult<Vec<CustomerDayRecord>> {
        for r in &mut rows {
            let offered = rng.chance(self.probability);
            let size = rng.beta(self.alpha, self.beta)?;
            let discount = if offered { size } else { 0.0 };
            self.discount.set(r, discount.min(self.max_discount));
        }
        Ok(rows)
    }
}

/// Linear payment propensity, used as the mean of a Normal draw.
#[derive(Debug, Clone, Copy)]
pub struct PaymentModel {
    pub base:            f64,
    pub debt_weight:     f64,
    pub interest_weight: f64,
    pub educ_weight:     f64,
    pub educ_pivot:      f64,
    pub std_dev:         f64,
}

impl PaymentModel {
    pub fn mean(&self, initial_debt: f64, interest: f64, educ: f64) -> f64 {
        self.base + self.debt_weight * initial_debt - self.interest_weight * interest
            + self.educ_weight * (educ - self.educ_pivot)
    }
}

/// Draws today's payment, clipped to `[0, debt + interest]`.
pub struct SimulatePayment {
    pub payment:      Amount,
    pub initial_debt: Amount,
    pub debt:         Amount,
    pub interest:     Amount,
    pub educ:         Amount,
    pub model:        PaymentModel,
}

impl Transform for SimulatePayment {
    fn name(&self) -> &'static str { "simulate_payment" }

    fn apply(
        &self,
        mut rows: Vec<CustomerDayRecord>,
        _ctx: &DayContext<'_>,
        rng: &mut dyn Sampler,
    ) -> SimResult<Vec<CustomerDayRecord>> {
        for r in &mut rows {
            let interest = self.interest.get(r);
            let mean = self.model.mean(self.initial_debt.get(r), interest, self.educ.get(r));
            let draw = rng.normal(mean, self.model.std_dev)?;
            // Lower bound first, then upper: a negative balance wins.
            let payment = draw.max(0.0).min(self.debt.get(r) + interest);
            self.payment.set(r, payment);
        }
        Ok(rows)
    }
}

/// `debt := debt + interest - payment`.
pub struct UpdateDebt {
    pub debt:           Amount,
    pub interest:       Amount,
    pub payment:        Amount,
    pub discount:       Amount,
    pub interest_mode:  InterestMode,
    pub apply_discount: bool,
}

impl Transform for UpdateDebt {
    fn name(&self) -> &'static str { "update_debt" }

    fn apply(
        &self,
        mut rows: Vec<CustomerDayRecord>,
        ctx: &DayContext<'_>,
        _rng: &mut dyn Sampler,
    ) -> SimResult<Vec<CustomerDayRecord>> {
        for (r, before) in rows.iter_mut().zip(ctx.yesterday) {
            let charged = match self.interest_mode {
                InterestMode::Cumulative  => self.interest.get(r),
                InterestMode::Incremental => self.interest.get(r) - self.interest.get(before),
            };
            let mut debt = self.debt.get(r) + charged - self.payment.get(r);
            if self.apply_discount {
                debt *= 1.0 - self.discount.get(r);
            }
            self.debt.set(r, debt);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{sampler::MeanSampler, types::CustomerId};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2016, 1, d).unwrap()
    }

    fn row(debt: f64, interest: f64, days_late: u32) -> CustomerDayRecord {
        CustomerDayRecord {
            id: CustomerId::from_random_bytes([days_late as u8; 16]),
            date: day(1),
            initial_debt: 1000.0,
            debt,
            days_late,
            payment: 0.0,
            age: 7300,
            discount: 0.0,
            interest,
            action: None,
            financial_educ: 45.0,
        }
    }

    fn apply_one(stage: &dyn Transform, rows: Vec<CustomerDayRecord>) -> Vec<CustomerDayRecord> {
        let yesterday = rows.clone();
        let ctx = DayContext { today: day(2), yesterday: &yesterday };
        stage.apply(rows, &ctx, &mut MeanSampler::new()).unwrap()
    }

    #[test]
    fn default_pipeline_runs_stages_in_documented_order() {
        assert_eq!(
            Pipeline::default().stage_names(),
            vec![
                "advance_clock",
                "accrue_interest",
                "drift_financial_educ",
                "offer_discount",
                "simulate_payment",
                "update_debt",
            ]
        );
    }

    #[test]
    fn interest_stops_at_cutoff() {
        let stage = AccrueInterest {
            interest: Amount::Interest,
            debt: Amount::Debt,
            days_late: Counter::DaysLate,
            daily_rate: 0.004,
            cutoff_days: 100,
        };
        let out = apply_one(&stage, vec![row(1000.0, 7.0, 99), row(1000.0, 7.0, 100), row(1000.0, 7.0, 150)]);
        assert!((out[0].interest - 11.0).abs() < 1e-12, "below cutoff accrues");
        assert_eq!(out[1].interest, 7.0, "at cutoff adds nothing");
        assert_eq!(out[2].interest, 7.0, "past cutoff adds nothing");
    }

    #[test]
    fn payment_clip_tolerates_negative_balance() {
        let stage = SimulatePayment {
            payment: Amount::Payment,
            initial_debt: Amount::InitialDebt,
            debt: Amount::Debt,
            interest: Amount::Interest,
            educ: Amount::FinancialEduc,
            model: PaymentModel {
                base: 50.0,
                debt_weight: 0.05,
                interest_weight: 2.0,
                educ_weight: 10.0,
                educ_pivot: 50.0,
                std_dev: 50.0,
            },
        };
        let out = apply_one(&stage, vec![row(-5.0, 1.0, 3), row(10.0, 0.0, 4)]);
        assert_eq!(out[0].payment, -4.0, "upper bound applied after lower bound");
        assert_eq!(out[1].payment, 10.0, "payment capped at debt + interest");
    }

    #[test]
    fn discount_is_capped() {
        let stage = OfferDiscount {
            discount: Amount::Discount,
            probability: 1.0,
            alpha: 9.0,
            beta: 1.0,
            max_discount: 0.5,
        };
        let out = apply_one(&stage, vec![row(100.0, 0.0, 2)]);
        assert_eq!(out[0].discount, 0.5);
    }

    #[test]
    fn incremental_mode_charges_only_todays_accrual() {
        let stage = UpdateDebt {
            debt: Amount::Debt,
            interest: Amount::Interest,
            payment: Amount::Payment,
            discount: Amount::Discount,
            interest_mode: InterestMode::Incremental,
            apply_discount: false,
        };
        let yesterday = vec![row(1000.0, 10.0, 5)];
        let mut today = yesterday.clone();
        today[0].interest = 14.0;
        today[0].payment = 20.0;

        let ctx = DayContext { today: day(2), yesterday: &yesterday };
        let out = stage.apply(today, &ctx, &mut MeanSampler::new()).unwrap();
        assert!((out[0].debt - 984.0).abs() < 1e-12, "debt was {}", out[0].debt);
    }

    #[test]
    fn discount_mode_scales_the_balance() {
        let stage = UpdateDebt {
            debt: Amount::Debt,
            interest: Amount::Interest,
            payment: Amount::Payment,
            discount: Amount::Discount,
            interest_mode: InterestMode::Cumulative,
            apply_discount: true,
        };
        let mut r = row(100.0, 10.0, 5);
        r.payment = 10.0;
        r.discount = 0.25;
        let out = apply_one(&stage, vec![r]);
        assert!((out[0].debt - 75.0).abs() < 1e-12);
    }

    struct DropFirst;

    impl Transform for DropFirst {
        fn name(&self) -> &'static str { "drop_first" }

        fn apply(
            &self,
            mut rows: Vec<CustomerDayRecord>,
            _ctx: &DayContext<'_>,
            _rng: &mut dyn Sampler,
        ) -> SimResult<Vec<CustomerDayRecord>> {
            rows.remove(0);
            Ok(rows)
        }
    }

    #[test]
    #[should_panic(expected = "stage 'drop_first' changed the row count")]
    fn stage_that_drops_rows_panics() {
        let mut pipeline = Pipeline::new();
        pipeline.register(Box::new(DropFirst));
        let _ = pipeline.run(&[row(1.0, 0.0, 2), row(2.0, 0.0, 3)], day(2), &mut MeanSampler::new());
    }
}
