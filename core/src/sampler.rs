//! The draws the simulation needs, behind one object-safe trait.
//!
//! `SimRng` samples the real distributions through `rand_distr`.
//! `MeanSampler` answers every draw with the distribution's expectation,
//! which turns a simulated day into a closed-form calculation.

use crate::{
    error::{SimError, SimResult},
    rng::SimRng,
};
use rand_distr::{Beta, Distribution, Gamma, Normal, Poisson};

pub trait Sampler: Send {
    /// Count drawn from Poisson(lambda).
    fn poisson(&mut self, lambda: f64) -> SimResult<u64>;

    /// Gamma with the (shape, scale) parameterisation.
    fn gamma(&mut self, shape: f64, scale: f64) -> SimResult<f64>;

    fn beta(&mut self, alpha: f64, beta: f64) -> SimResult<f64>;

    fn normal(&mut self, mean: f64, std_dev: f64) -> SimResult<f64>;

    /// Bernoulli trial: true with probability p.
    fn chance(&mut self, p: f64) -> bool;
}

fn invalid(distribution: &'static str, reason: impl ToString) -> SimError {
    SimError::InvalidDistribution {
        distribution,
        reason: reason.to_string(),
    }
}

/// `rand_distr` accepts a negative std and samples the mirrored
/// distribution; both samplers reject it instead.
fn check_std_dev(std_dev: f64) -> SimResult<()> {
    if std_dev >= 0.0 && std_dev.is_finite() {
        Ok(())
    } else {
        Err(invalid("normal", format!("std_dev must be finite and >= 0, got {std_dev}")))
    }
}

impl Sampler for SimRng {
    fn poisson(&mut self, lambda: f64) -> SimResult<u64> {
        let dist = Poisson::new(lambda).map_err(|e| invalid("poisson", e))?;
        let draw: f64 = dist.sample(self.engine());
        Ok(draw as u64)
    }

    fn gamma(&mut self, shape: f64, scale: f64) -> SimResult<f64> {
        let dist = Gamma::new(shape, scale).map_err(|e| invalid("gamma", e))?;
        Ok(dist.sample(self.engine()))
    }

    fn beta(&mut self, alpha: f64, beta: f64) -> SimResult<f64> {
        let dist = Beta::new(alpha, beta).map_err(|e| invalid("beta", e))?;
        Ok(dist.sample(self.engine()))
    }

    fn normal(&mut self, mean: f64, std_dev: f64) -> SimResult<f64> {
        check_std_dev(std_dev)?;
        let dist = Normal::new(mean, std_dev).map_err(|e| invalid("normal", e))?;
        Ok(dist.sample(self.engine()))
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Expectation-only sampler.
///
/// Poisson counts default to `round(lambda)` and can be pinned with
/// [`MeanSampler::with_arrivals`]. A Bernoulli trial succeeds when its
/// probability is at least one half.
#[derive(Debug, Clone, Default)]
pub struct MeanSampler {
    arrivals: Option<u64>,
}

impl MeanSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arrivals(mut self, n: u64) -> Self {
        self.arrivals = Some(n);
        self
    }
}

impl Sampler for MeanSampler {
    fn poisson(&mut self, lambda: f64) -> SimResult<u64> {
        if !(lambda >= 0.0 && lambda.is_finite()) {
            return Err(invalid("poisson", format!("lambda must be finite and >= 0, got {lambda}")));
        }
        Ok(self.arrivals.unwrap_or(lambda.round() as u64))
    }

    fn gamma(&mut self, shape: f64, scale: f64) -> SimResult<f64> {
        if !(shape > 0.0 && scale > 0.0) {
            return Err(invalid("gamma", format!("shape={shape} scale={scale}")));
        }
        Ok(shape * scale)
    }

    fn beta(&mut self, alpha: f64, beta: f64) -> SimResult<f64> {
        if !(alpha > 0.0 && beta > 0.0) {
            return Err(invalid("beta", format!("alpha={alpha} beta={beta}")));
        }
        Ok(alpha / (alpha + beta))
    }

    fn normal(&mut self, mean: f64, std_dev: f64) -> SimResult<f64> {
        check_std_dev(std_dev)?;
        Ok(mean)
    }

    fn chance(&mut self, p: f64) -> bool {
        p >= 0.5
    }
}
