//! Closed-form days: every draw replaced by its expectation.

use chrono::NaiveDate;
use collection_core::{
    config::SimConfig,
    rng::StreamSet,
    sampler::MeanSampler,
    Environment,
};

fn expectation_env(arrivals: u64) -> Environment {
    let streams = StreamSet::with_sampler(2016, MeanSampler::new().with_arrivals(arrivals));
    Environment::with_samplers(SimConfig::default(), streams)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

#[test]
fn bootstrap_customer_first_day_matches_formulas() {
    let mut env = expectation_env(0);
    let bootstrap = env.history().rows()[0].clone();

    let report = env.next_day().unwrap();
    assert_eq!(report.new_customers, 0);
    assert_eq!(report.continued, 1);
    assert_eq!(report.terminated, 0);

    let today = env.history().on(NaiveDate::from_ymd_opt(2016, 1, 2).unwrap());
    assert_eq!(today.len(), 1);
    let r = &today[0];

    assert_eq!(r.id, bootstrap.id);
    assert_eq!(r.date, NaiveDate::from_ymd_opt(2016, 1, 2).unwrap());
    assert_eq!(r.days_late, 2);
    assert_eq!(r.age, bootstrap.age + 1);
    assert_eq!(r.initial_debt, 1000.0);

    // days_late 2 < 100: interest = 0 + 1000 * 0.004
    let interest = 4.0;
    assert!(close(r.interest, interest), "interest {}", r.interest);

    // 45 * 0.99 + E[Beta(10, 1)] * 100 * 0.01
    let educ = 45.0 * 0.99 + (10.0 / 11.0) * 100.0 * 0.01;
    assert!(close(r.financial_educ, educ), "financial_educ {}", r.financial_educ);

    // Offer succeeds at p = 0.5; E[Beta(0.9, 4)] is under the 0.5 cap.
    let discount = 0.9 / 4.9;
    assert!(close(r.discount, discount), "discount {}", r.discount);

    let payment = (50.0 + 0.05 * 1000.0 - 2.0 * interest + 10.0 * (educ - 50.0)).clamp(0.0, 1000.0 + interest);
    assert!(close(r.payment, payment), "payment {}", r.payment);

    let debt = 1000.0 + interest - payment;
    assert!(close(r.debt, debt), "debt {}", r.debt);
    assert!(r.carries_forward());
}

#[test]
fn cumulative_interest_is_charged_again_on_day_two() {
    let mut env = expectation_env(0);
    env.run_days(2).unwrap();

    let rows = env.history().rows();
    assert_eq!(rows.len(), 3);
    let (day1, day2) = (&rows[1], &rows[2]);

    assert!(close(day2.interest, day1.interest + day1.debt * 0.004));
    assert!(close(day2.debt, day1.debt + day2.interest - day2.payment));
}

#[test]
fn expectation_arrivals_have_expected_attributes() {
    let mut env = expectation_env(3);
    let report = env.next_day().unwrap();
    assert_eq!(report.new_customers, 3);

    let fresh: Vec<_> = env.history().rows().iter().filter(|r| r.days_late == 1 && r.date == report.date).collect();
    assert_eq!(fresh.len(), 3);

    let educ = ((1.0 / 3.0 + 3.8 / 5.8) * 50.0_f64).trunc();
    for r in fresh {
        assert_eq!(r.age, 38 * 365);
        assert_eq!(r.financial_educ, educ);
        assert!(close(r.debt, 5000.0 / educ));
    }
}

#[test]
fn seed_comes_from_the_stream_set() {
    let env = expectation_env(0);
    assert_eq!(env.seed(), 2016);
    assert_eq!(env.day(), 0);
}
