//! Random content for generated claims.
//!
//! All randomness used by the simulation flows through a single
//! [`RandomContent`] value. It is constructed explicitly and handed to the
//! components that draw from it, so a seeded instance makes a whole run
//! reproducible.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use uuid::{Builder, Uuid};

use crate::claim::{CustomerProfile, Source};
use crate::error::{Result, SimulatorError};

pub const MIN_AGE: i32 = 21;
pub const MAX_AGE: i32 = 80;

/// Claim costs are `COST_UNIT * [0, COST_STEPS)`.
pub const COST_UNIT: i32 = 100;
pub const COST_STEPS: i32 = 10;

/// Fixed tables new claims are drawn from.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    customers: Vec<CustomerProfile>,
    non_mobile_sources: Vec<Source>,
    damage_descriptions: Vec<String>,
}

impl ReferenceData {
    pub fn new(
        customers: Vec<CustomerProfile>,
        non_mobile_sources: Vec<Source>,
        damage_descriptions: Vec<String>,
    ) -> Result<Self> {
        if customers.is_empty() {
            return Err(SimulatorError::ReferenceData(
                "customer list is empty".to_string(),
            ));
        }
        if non_mobile_sources.is_empty() {
            return Err(SimulatorError::ReferenceData(
                "non-mobile source list is empty".to_string(),
            ));
        }
        if non_mobile_sources.contains(&Source::Mobile) {
            return Err(SimulatorError::ReferenceData(
                "Mobile cannot be listed as a non-mobile source".to_string(),
            ));
        }
        if damage_descriptions.is_empty() {
            return Err(SimulatorError::ReferenceData(
                "damage description list is empty".to_string(),
            ));
        }

        Ok(Self {
            customers,
            non_mobile_sources,
            damage_descriptions,
        })
    }

    pub fn customers(&self) -> &[CustomerProfile] {
        &self.customers
    }

    pub fn non_mobile_sources(&self) -> &[Source] {
        &self.non_mobile_sources
    }

    pub fn damage_descriptions(&self) -> &[String] {
        &self.damage_descriptions
    }
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self {
            customers: vec![
                CustomerProfile::new(
                    "Ronny Doyle",
                    "RonnyDoyle@mail.com",
                    "790 Arrowhead Court, Portsmouth",
                    "VA",
                    "WMC-9628",
                ),
                CustomerProfile::new(
                    "Nella Beard",
                    "NBeard@mail.com",
                    "8774 Inverness Dr., Janesville",
                    "WI",
                    "787-YWR",
                ),
                CustomerProfile::new(
                    "Andy Rosales",
                    "AndyR@mail.com",
                    "9783 Oxford St., Duluth",
                    "GA",
                    "GWL3149",
                ),
            ],
            non_mobile_sources: Source::NON_MOBILE.to_vec(),
            damage_descriptions: vec![
                "Cracked windscreen".to_string(),
                "Wheel fell off".to_string(),
                "Dent in door".to_string(),
                "Won't start".to_string(),
            ],
        }
    }
}

/// Uniform random draws over the reference data and numeric ranges.
pub struct RandomContent {
    rng: ChaCha20Rng,
    reference: ReferenceData,
}

impl RandomContent {
    /// Deterministic provider, used by tests and reproducible runs
    pub fn seeded(reference: ReferenceData, seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            reference,
        }
    }

    pub fn from_entropy(reference: ReferenceData) -> Self {
        Self::seeded(reference, rand::random())
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Uniformly chosen element of `choices`.
    ///
    /// # Panics
    ///
    /// Panics if `choices` is empty. The reference lists are validated by
    /// [`ReferenceData::new`], so the derived helpers below never do.
    pub fn pick<'a, T>(&mut self, choices: &'a [T]) -> &'a T {
        pick(&mut self.rng, choices)
    }

    /// Uniform integer in `[low, high)`. An empty range yields `low`.
    pub fn range(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.rng.random_range(low..high)
    }

    /// A version 4 UUID built from this provider's random stream.
    pub fn quote_id(&mut self) -> Uuid {
        Builder::from_random_bytes(self.rng.random()).into_uuid()
    }

    pub fn customer(&mut self) -> CustomerProfile {
        pick(&mut self.rng, &self.reference.customers).clone()
    }

    pub fn non_mobile_source(&mut self) -> Source {
        *pick(&mut self.rng, &self.reference.non_mobile_sources)
    }

    pub fn damage_description(&mut self) -> String {
        pick(&mut self.rng, &self.reference.damage_descriptions).clone()
    }

    pub fn age(&mut self) -> i32 {
        self.range(MIN_AGE, MAX_AGE)
    }

    pub fn claim_cost(&mut self) -> i32 {
        COST_UNIT * self.range(0, COST_STEPS)
    }

    /// True two times out of three.
    pub fn skip_status_three(&mut self) -> bool {
        self.range(0, 3) > 0
    }
}

fn pick<'a, T>(rng: &mut ChaCha20Rng, choices: &'a [T]) -> &'a T {
    &choices[rng.random_range(0..choices.len())]
}
