//! Synthetic debt-collection population.
//!
//! Every simulated day new debtors arrive and existing ones accrue
//! interest, drift in financial education, receive discount offers and
//! pay. The output is an append-only customer-day history.

pub mod clock;
pub mod config;
pub mod environment;
pub mod error;
pub mod history;
pub mod onboarding;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod rng;
pub mod sampler;
pub mod transform;
pub mod types;

pub use environment::Environment;
pub use record::CustomerDayRecord;
