//! Simulation parameters.
//!
//! Every default below is the constant the collection scenario is tuned
//! for. A JSON file may override any subset; missing fields keep their
//! defaults.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Date of the bootstrap row and of a fresh Environment.
    pub epoch: NaiveDate,
    pub bootstrap: BootstrapConfig,
    pub arrivals: ArrivalConfig,
    pub onboarding: OnboardingConfig,
    pub dynamics: DynamicsConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            epoch: NaiveDate::from_ymd_opt(2016, 1, 1).expect("2016-01-01 is a valid date"),
            bootstrap: BootstrapConfig::default(),
            arrivals: ArrivalConfig::default(),
            onboarding: OnboardingConfig::default(),
            dynamics: DynamicsConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load overrides from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let config: SimConfig = serde_json::from_str(&content)?;
        Ok(config)
    }
}

/// The single row a fresh history starts with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub initial_debt: f64,
    pub age_days: u32,
    pub financial_educ: f64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            initial_debt: 1000.0,
            age_days: 20 * 365,
            financial_educ: 45.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrivalConfig {
    /// Poisson rate of new customers per day.
    pub daily_mean: f64,
}

impl Default for ArrivalConfig {
    fn default() -> Self {
        Self { daily_mean: 5.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnboardingConfig {
    pub days_per_year: f64,
    /// age = (Gamma(shape, scale) + min_age_years) * days_per_year
    pub age_gamma_shape: f64,
    pub age_gamma_scale: f64,
    pub min_age_years: f64,
    /// educ = (Beta(base_alpha, base_beta) + Beta(age / (age_divisor_years * days_per_year), age_beta)) * scale
    pub educ_base_alpha: f64,
    pub educ_base_beta: f64,
    pub educ_age_divisor_years: f64,
    pub educ_age_beta: f64,
    pub educ_scale: f64,
    /// debt = max(Normal(debt_numerator / educ, debt_std), min_debt)
    pub debt_numerator: f64,
    pub debt_std: f64,
    pub min_debt: f64,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            days_per_year: 365.0,
            age_gamma_shape: 2.0,
            age_gamma_scale: 10.0,
            min_age_years: 18.0,
            educ_base_alpha: 10.0,
            educ_base_beta: 20.0,
            educ_age_divisor_years: 10.0,
            educ_age_beta: 2.0,
            educ_scale: 50.0,
            debt_numerator: 5000.0,
            debt_std: 700.0,
            min_debt: 10.0,
        }
    }
}

/// How the debt update treats the interest column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestMode {
    /// Add the whole accumulated interest to debt every day.
    Cumulative,
    /// Add only the interest accrued today.
    Incremental,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsConfig {
    pub daily_interest: f64,
    /// No interest accrues once days_late reaches this value.
    pub interest_cutoff_days: u32,

    pub educ_learning_rate: f64,
    pub educ_target_alpha: f64,
    pub educ_target_beta: f64,
    pub educ_target_scale: f64,

    pub discount_probability: f64,
    pub discount_alpha: f64,
    pub discount_beta: f64,
    pub max_discount: f64,

    /// mean = base + debt_weight*initial_debt - interest_weight*interest + educ_weight*(educ - educ_pivot)
    pub payment_base: f64,
    pub payment_debt_weight: f64,
    pub payment_interest_weight: f64,
    pub payment_educ_weight: f64,
    pub payment_educ_pivot: f64,
    pub payment_std: f64,

    pub interest_mode: InterestMode,
    /// Multiply the post-payment balance by (1 - discount).
    pub apply_discount: bool,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            daily_interest: 0.004,
            interest_cutoff_days: 100,
            educ_learning_rate: 0.01,
            educ_target_alpha: 10.0,
            educ_target_beta: 1.0,
            educ_target_scale: 100.0,
            discount_probability: 0.5,
            discount_alpha: 0.9,
            discount_beta: 4.0,
            max_discount: 0.5,
            payment_base: 50.0,
            payment_debt_weight: 0.05,
            payment_interest_weight: 2.0,
            payment_educ_weight: 10.0,
            payment_educ_pivot: 50.0,
            payment_std: 50.0,
            interest_mode: InterestMode::Cumulative,
            apply_discount: false,
        }
    }
}
