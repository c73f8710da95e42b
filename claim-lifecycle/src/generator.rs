use std::sync::Arc;
use tracing::info;

use crate::{
    claim::{Claim, Lane, Source},
    content::RandomContent,
    error::{Result, SimulatorError},
    storage::ClaimStore,
};

/// Synthesizes brand-new claims at status 1 and inserts them into the store.
#[derive(Clone)]
pub struct ClaimGenerator {
    store: Arc<dyn ClaimStore>,
}

impl ClaimGenerator {
    pub fn new(store: Arc<dyn ClaimStore>) -> Self {
        Self { store }
    }

    /// Create and persist one claim for `lane`.
    ///
    /// Mobile claims always carry the `Mobile` source; non-mobile claims get
    /// a source drawn from the reference data.
    pub async fn create_claim(&self, lane: Lane, content: &mut RandomContent) -> Result<Claim> {
        let quote_id = content.quote_id();
        let source = match lane {
            Lane::Mobile => Source::Mobile,
            Lane::NonMobile => content.non_mobile_source(),
        };
        let customer = content.customer();
        let age = content.age();
        let description = content.damage_description();

        let claim = Claim::submitted(quote_id, source, &customer, age, description);
        let id = self.store.insert(&claim).await?;
        if id != claim.quote_id {
            return Err(SimulatorError::InsertMismatch {
                expected: claim.quote_id,
                returned: id,
            });
        }

        info!(quote_id = %id, source = %claim.source, "Created new claim");
        Ok(claim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::ClaimStatus;
    use crate::content::{MAX_AGE, MIN_AGE, ReferenceData};
    use crate::storage::InMemoryClaimStore;

    #[tokio::test]
    async fn test_mobile_claim_is_submitted_without_cost() {
        let store = Arc::new(InMemoryClaimStore::with_seed(1));
        let generator = ClaimGenerator::new(store.clone());
        let mut content = RandomContent::seeded(ReferenceData::default(), 1);

        let claim = generator.create_claim(Lane::Mobile, &mut content).await.unwrap();

        assert_eq!(claim.source, Source::Mobile);
        assert_eq!(claim.status, ClaimStatus::SUBMITTED);
        assert_eq!(claim.claim_cost, None);
        assert!((MIN_AGE..MAX_AGE).contains(&claim.age));
        assert_eq!(store.get(claim.quote_id).await.unwrap(), Some(claim));
    }

    #[tokio::test]
    async fn test_non_mobile_claims_copy_reference_data() {
        let store = Arc::new(InMemoryClaimStore::with_seed(1));
        let generator = ClaimGenerator::new(store.clone());
        let reference = ReferenceData::default();
        let mut content = RandomContent::seeded(reference.clone(), 9);

        for _ in 0..25 {
            let claim = generator.create_claim(Lane::NonMobile, &mut content).await.unwrap();
            assert_ne!(claim.source, Source::Mobile);
            assert!(
                reference
                    .customers()
                    .iter()
                    .any(|c| c.name == claim.name && c.license_plate == claim.license_plate)
            );
            assert!(
                reference
                    .damage_descriptions()
                    .contains(&claim.description_of_damage)
            );
        }
        assert_eq!(store.count_all().await.unwrap(), 25);
    }

    #[tokio::test]
    async fn test_same_seed_generates_same_claims() {
        let first = ClaimGenerator::new(Arc::new(InMemoryClaimStore::with_seed(1)));
        let second = ClaimGenerator::new(Arc::new(InMemoryClaimStore::with_seed(1)));
        let mut a = RandomContent::seeded(ReferenceData::default(), 12);
        let mut b = RandomContent::seeded(ReferenceData::default(), 12);

        for lane in [Lane::Mobile, Lane::NonMobile, Lane::NonMobile] {
            let left = first.create_claim(lane, &mut a).await.unwrap();
            let right = second.create_claim(lane, &mut b).await.unwrap();
            assert_eq!(left, right);
        }
    }
}
