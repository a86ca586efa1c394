//! New-customer generation.
//!
//! Every new customer enters one day late with no payment, interest or
//! discount. Age, financial education and debt are drawn in that order,
//! each depending on the one before.

use crate::{
    config::{BootstrapConfig, OnboardingConfig},
    error::SimResult,
    record::CustomerDayRecord,
    rng::SimRng,
    sampler::Sampler,
    types::CustomerId,
};
use chrono::NaiveDate;

pub struct Onboarding {
    config: OnboardingConfig,
}

impl Onboarding {
    pub fn new(config: OnboardingConfig) -> Self {
        Self { config }
    }

    /// Materialise `n` independent customers dated `date`.
    pub fn generate(
        &self,
        date: NaiveDate,
        n: usize,
        rng: &mut dyn Sampler,
        ids: &mut SimRng,
    ) -> SimResult<Vec<CustomerDayRecord>> {
        let mut customers = Vec::with_capacity(n);

        for _ in 0..n {
            let age = self.draw_age(rng)?;
            let financial_educ = self.draw_financial_educ(age, rng)?;
            let debt = self.draw_debt(financial_educ, rng)?;

            customers.push(CustomerDayRecord {
                id: CustomerId::from_random_bytes(ids.next_bytes16()),
                date,
                initial_debt: debt,
                debt,
                days_late: 1,
                payment: 0.0,
                age,
                discount: 0.0,
                interest: 0.0,
                action: None,
                financial_educ,
            });
        }
        Ok(customers)
    }

    /// The single hand-written row a fresh history starts with.
    pub fn bootstrap(config: &BootstrapConfig, date: NaiveDate, ids: &mut SimRng) -> CustomerDayRecord {
        CustomerDayRecord {
            id: CustomerId::from_random_bytes(ids.next_bytes16()),
            date,
            initial_debt: config.initial_debt,
            debt: config.initial_debt,
            days_late: 1,
            payment: 0.0,
            age: config.age_days,
            discount: 0.0,
            interest: 0.0,
            action: None,
            financial_educ: config.financial_educ,
        }
    }

    /// Adult population skewed young.
    fn draw_age(&self, rng: &mut dyn Sampler) -> SimResult<u32> {
        let c = &self.config;
        let years = rng.gamma(c.age_gamma_shape, c.age_gamma_scale)? + c.min_age_years;
        Ok((years * c.days_per_year) as u32)
    }

    /// Loosely increasing with age; above the scale only past ~30 years.
    fn draw_financial_educ(&self, age: u32, rng: &mut dyn Sampler) -> SimResult<f64> {
        let c = &self.config;
        let base = rng.beta(c.educ_base_alpha, c.educ_base_beta)?;
        let age_alpha = age as f64 / (c.educ_age_divisor_years * c.days_per_year);
        let from_age = rng.beta(age_alpha, c.educ_age_beta)?;
        Ok(((base + from_age) * c.educ_scale).trunc())
    }

    /// Lower education draws larger debts on average.
    fn draw_debt(&self, financial_educ: f64, rng: &mut dyn Sampler) -> SimResult<f64> {
        let c = &self.config;
        let debt = rng.normal(c.debt_numerator / financial_educ, c.debt_std)?;
        Ok(debt.max(c.min_debt))
    }
}
