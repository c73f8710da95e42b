use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::{
    claim::{Claim, ClaimStatus, Lane, OutstandingClaim},
    error::{Result, SimulatorError},
};

/// Trait for persisting claims and selecting claims to advance
#[async_trait]
pub trait ClaimStore: Send + Sync {
    /// Insert a new claim and return the identifier the store confirmed.
    /// An existing quote id is rejected with `DuplicateQuote`.
    async fn insert(&self, claim: &Claim) -> Result<Uuid>;

    /// Total number of claims, regardless of status.
    async fn count_all(&self) -> Result<i64>;

    /// A uniformly random claim in `lane` whose status is below terminal.
    async fn select_random_eligible(&self, lane: Lane) -> Result<Option<OutstandingClaim>>;

    /// Point update by quote id. `claim_cost` is only written when present.
    /// Returns the number of rows affected.
    async fn update_status(
        &self,
        quote_id: Uuid,
        status: ClaimStatus,
        claim_cost: Option<i32>,
    ) -> Result<u64>;

    async fn get(&self, quote_id: Uuid) -> Result<Option<Claim>>;
}

/// In-memory implementation of ClaimStore
pub struct InMemoryClaimStore {
    claims: Arc<DashMap<Uuid, Claim>>,
    rng: Mutex<ChaCha20Rng>,
}

impl InMemoryClaimStore {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Store whose random selection is reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self {
            claims: Arc::new(DashMap::new()),
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }

    /// Copy of every stored claim, ordered by quote id.
    pub fn snapshot(&self) -> Vec<Claim> {
        let mut claims: Vec<Claim> = self.claims.iter().map(|entry| entry.clone()).collect();
        claims.sort_by_key(|claim| claim.quote_id);
        claims
    }

    fn choose(&self, eligible: &[OutstandingClaim]) -> Option<OutstandingClaim> {
        if eligible.is_empty() {
            return None;
        }
        let index = match self.rng.lock() {
            Ok(mut rng) => rng.random_range(0..eligible.len()),
            Err(poisoned) => poisoned.into_inner().random_range(0..eligible.len()),
        };
        Some(eligible[index])
    }
}

impl Default for InMemoryClaimStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClaimStore for InMemoryClaimStore {
    async fn insert(&self, claim: &Claim) -> Result<Uuid> {
        match self.claims.entry(claim.quote_id) {
            Entry::Occupied(_) => Err(SimulatorError::DuplicateQuote(claim.quote_id)),
            Entry::Vacant(slot) => {
                slot.insert(claim.clone());
                Ok(claim.quote_id)
            }
        }
    }

    async fn count_all(&self) -> Result<i64> {
        Ok(self.claims.len() as i64)
    }

    async fn select_random_eligible(&self, lane: Lane) -> Result<Option<OutstandingClaim>> {
        // DashMap iteration order is not stable, sort before drawing.
        let mut eligible: Vec<OutstandingClaim> = self
            .claims
            .iter()
            .filter(|entry| lane.contains(entry.source) && !entry.status.is_terminal())
            .map(|entry| OutstandingClaim {
                quote_id: entry.quote_id,
                status: entry.status,
            })
            .collect();
        eligible.sort_by_key(|claim| claim.quote_id);

        Ok(self.choose(&eligible))
    }

    async fn update_status(
        &self,
        quote_id: Uuid,
        status: ClaimStatus,
        claim_cost: Option<i32>,
    ) -> Result<u64> {
        match self.claims.get_mut(&quote_id) {
            Some(mut claim) => {
                claim.status = status;
                if claim_cost.is_some() {
                    claim.claim_cost = claim_cost;
                }
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn get(&self, quote_id: Uuid) -> Result<Option<Claim>> {
        Ok(self.claims.get(&quote_id).map(|entry| entry.clone()))
    }
}
