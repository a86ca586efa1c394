//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through SimRng streams derived from the
//! single master seed held by the Environment.
//!
//! Each concern gets its own stream, seeded deterministically
//! from (master_seed XOR stream_index * golden-ratio constant). This means:
//!   - Adding a new stream never changes existing streams.
//!   - Each stream is fully reproducible in isolation.
//!   - A day with more arrivals does not shift the dynamics draws.

use crate::sampler::Sampler;
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single stream.
#[derive(Debug, Clone)]
pub struct SimRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SimRng {
    /// Create a stream RNG from the master seed and a stable
    /// stream index. The index must never change once assigned.
    pub fn new(master_seed: u64, stream_index: u64) -> Self {
        let derived_seed = master_seed ^ (stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Sixteen raw bytes, enough for one identifier.
    pub fn next_bytes16(&mut self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        self.inner.fill_bytes(&mut bytes);
        bytes
    }

    /// Mutable access for `rand_distr` sampling.
    pub(crate) fn engine(&mut self) -> &mut Pcg64Mcg {
        &mut self.inner
    }
}

/// Derives every stream of a run from one master seed.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_stream(&self, slot: StreamSlot) -> SimRng {
        SimRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }

    /// All streams an Environment needs, sampling from real distributions.
    pub fn stream_set(&self) -> StreamSet {
        StreamSet {
            seed:       self.master_seed,
            arrivals:   Box::new(self.for_stream(StreamSlot::Arrivals)),
            onboarding: Box::new(self.for_stream(StreamSlot::Onboarding)),
            dynamics:   Box::new(self.for_stream(StreamSlot::Dynamics)),
            identity:   self.for_stream(StreamSlot::Identity),
        }
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every stream's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Arrivals   = 0,
    Onboarding = 1,
    Dynamics   = 2,
    Identity   = 3,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Arrivals   => "arrivals",
            Self::Onboarding => "onboarding",
            Self::Dynamics   => "dynamics",
            Self::Identity   => "identity",
        }
    }
}

/// The samplers owned by one Environment.
///
/// Identifiers always come from a real seeded stream, so ids stay unique
/// even when the other streams are replaced by expectation-only samplers.
pub struct StreamSet {
    /// Master seed the identity stream (and any seeded stream) came from.
    pub seed:       u64,
    /// Daily arrival counts.
    pub arrivals:   Box<dyn Sampler>,
    /// New-customer attributes.
    pub onboarding: Box<dyn Sampler>,
    /// Per-day update pipeline.
    pub dynamics:   Box<dyn Sampler>,
    pub identity:   SimRng,
}

impl StreamSet {
    /// Replace the three drawing streams with clones of `sampler`.
    pub fn with_sampler<S>(master_seed: u64, sampler: S) -> Self
    where
        S: Sampler + Clone + 'static,
    {
        let bank = RngBank::new(master_seed);
        Self {
            seed:       master_seed,
            arrivals:   Box::new(sampler.clone()),
            onboarding: Box::new(sampler.clone()),
            dynamics:   Box::new(sampler),
            identity:   bank.for_stream(StreamSlot::Identity),
        }
    }
}
