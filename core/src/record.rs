//! One row of history: a customer's state on one simulated day.

use crate::types::CustomerId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerDayRecord {
    pub id:             CustomerId,
    pub date:           NaiveDate,
    pub initial_debt:   f64,
    pub debt:           f64,
    pub days_late:      u32,
    pub payment:        f64,
    /// Customer's age in days.
    pub age:            u32,
    pub discount:       f64,
    pub interest:       f64,
    /// Reserved for a collection action. Never populated.
    pub action:         Option<String>,
    /// Hidden trait; not observable by a policy.
    pub financial_educ: f64,
}

impl CustomerDayRecord {
    /// A customer is carried into the next day unless it paid more
    /// than its remaining debt.
    pub fn carries_forward(&self) -> bool {
        self.debt >= self.payment
    }
}

/// Selects a real-valued field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amount {
    InitialDebt,
    Debt,
    Payment,
    Discount,
    Interest,
    FinancialEduc,
}

impl Amount {
    pub fn get(self, r: &CustomerDayRecord) -> f64 {
        match self {
            Self::InitialDebt   => r.initial_debt,
            Self::Debt          => r.debt,
            Self::Payment       => r.payment,
            Self::Discount      => r.discount,
            Self::Interest      => r.interest,
            Self::FinancialEduc => r.financial_educ,
        }
    }

    pub fn set(self, r: &mut CustomerDayRecord, value: f64) {
        match self {
            Self::InitialDebt   => r.initial_debt = value,
            Self::Debt          => r.debt = value,
            Self::Payment       => r.payment = value,
            Self::Discount      => r.discount = value,
            Self::Interest      => r.interest = value,
            Self::FinancialEduc => r.financial_educ = value,
        }
    }
}

/// Selects a day-counting field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Age,
    DaysLate,
}

impl Counter {
    pub fn get(self, r: &CustomerDayRecord) -> u32 {
        match self {
            Self::Age      => r.age,
            Self::DaysLate => r.days_late,
        }
    }

    pub fn set(self, r: &mut CustomerDayRecord, value: u32) {
        match self {
            Self::Age      => r.age = value,
            Self::DaysLate => r.days_late = value,
        }
    }
}
