use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use claim_lifecycle::{
    Advancement, Claim, ClaimGenerator, ClaimStatus, ClaimStore, InMemoryClaimStore, Lane,
    LifecycleAdvancer, OutstandingClaim, RandomContent, ReferenceData, SchedulerSettings,
    SimulatorError, Source, TickScheduler,
};
use uuid::Uuid;

fn settings(seed_claims: u32) -> SchedulerSettings {
    SchedulerSettings {
        tick_interval: Duration::from_millis(1),
        seed_claims,
        ..SchedulerSettings::default()
    }
}

fn assert_step_is_valid(before: &Claim, after: &Claim) {
    assert_eq!(before.quote_id, after.quote_id);
    assert_eq!(before.source, after.source);
    assert_eq!(before.name, after.name);
    assert_eq!(before.age, after.age);
    assert_eq!(before.description_of_damage, after.description_of_damage);

    assert!(after.status >= before.status, "status went backwards");
    if before.claim_cost.is_some() {
        assert_eq!(before.claim_cost, after.claim_cost, "cost changed after assignment");
    }
    if after.status != before.status && after.source == Source::Mobile {
        assert_eq!(after.status.value(), before.status.value() + 1);
    }
    if before.status == ClaimStatus::TERMINAL {
        assert_eq!(before, after, "terminal claim was mutated");
    }
}

fn assert_claim_is_consistent(claim: &Claim) {
    assert!((1..=7).contains(&claim.status.value()));
    if claim.status < ClaimStatus::COSTED {
        assert_eq!(claim.claim_cost, None);
    } else {
        let cost = claim.claim_cost.expect("costed claim without a cost");
        assert_eq!(cost % 100, 0);
        assert!((0..1000).contains(&cost));
    }
}

#[tokio::test]
async fn seeding_an_empty_store_creates_mobile_claims() {
    let store = Arc::new(InMemoryClaimStore::with_seed(1));
    let content = RandomContent::seeded(ReferenceData::default(), 1);
    let mut scheduler = TickScheduler::new(store.clone(), content, settings(3));

    scheduler.seed_if_empty().await.unwrap();

    assert_eq!(store.count_all().await.unwrap(), 3);
    let claims = store.snapshot();
    assert!(claims.iter().all(|c| c.source == Source::Mobile));
    assert!(claims.iter().all(|c| c.status == ClaimStatus::SUBMITTED));
    assert!(claims.iter().all(|c| c.claim_cost.is_none()));
}

#[tokio::test]
async fn long_simulation_keeps_every_claim_consistent() {
    let store = Arc::new(InMemoryClaimStore::with_seed(77));
    let content = RandomContent::seeded(ReferenceData::default(), 77);
    let mut scheduler = TickScheduler::new(store.clone(), content, settings(5));
    scheduler.seed_if_empty().await.unwrap();

    let mut previous: HashMap<Uuid, Claim> = store
        .snapshot()
        .into_iter()
        .map(|c| (c.quote_id, c))
        .collect();

    for _ in 0..300 {
        let report = scheduler.run_tick().await.unwrap();
        if let Some(step) = report.mobile {
            assert!(!step.skipped);
        }

        let current = store.snapshot();
        for claim in &current {
            assert_claim_is_consistent(claim);
            match previous.get(&claim.quote_id) {
                Some(before) => assert_step_is_valid(before, claim),
                None => {
                    assert_eq!(claim.status, ClaimStatus::SUBMITTED);
                    assert_eq!(claim.claim_cost, None);
                }
            }
        }
        previous = current.into_iter().map(|c| (c.quote_id, c)).collect();
    }

    // 5 seeded + one new claim every third tick
    assert_eq!(store.count_all().await.unwrap(), 105);
    assert!(
        previous
            .values()
            .any(|c| c.status == ClaimStatus::TERMINAL)
    );
}

#[tokio::test]
async fn non_mobile_claim_from_two_reaches_terminal_on_a_known_path() {
    let mut skipped_paths = 0;
    let runs = 300;

    for seed in 0..runs {
        let store = Arc::new(InMemoryClaimStore::with_seed(seed));
        let mut content = RandomContent::seeded(ReferenceData::default(), seed);
        let claim = ClaimGenerator::new(store.clone())
            .create_claim(Lane::NonMobile, &mut content)
            .await
            .unwrap();
        let two = ClaimStatus::try_from(2).unwrap();
        store.update_status(claim.quote_id, two, None).await.unwrap();

        let advancer = LifecycleAdvancer::new(store.clone());
        let mut statuses = vec![2];
        let mut cost_from = None;
        while let Some(step) = advancer.advance(Lane::NonMobile, &mut content).await.unwrap() {
            statuses.push(step.to.value());
            let stored = store.get(claim.quote_id).await.unwrap().unwrap();
            if stored.claim_cost.is_some() && cost_from.is_none() {
                cost_from = Some(step.to.value());
            }
        }

        match statuses.as_slice() {
            [2, 4, 5, 6, 7] => skipped_paths += 1,
            [2, 3, 4, 5, 6, 7] => {}
            other => panic!("unexpected status path {other:?}"),
        }
        assert_eq!(cost_from, Some(5));
    }

    let ratio = skipped_paths as f64 / runs as f64;
    assert!((0.55..0.78).contains(&ratio), "skip ratio was {ratio}");
}

/// Selects a claim the wrapped store no longer holds, as if it had been
/// deleted between selection and update.
struct VanishingClaimStore {
    inner: InMemoryClaimStore,
    ghost: OutstandingClaim,
}

#[async_trait]
impl ClaimStore for VanishingClaimStore {
    async fn insert(&self, claim: &Claim) -> claim_lifecycle::Result<Uuid> {
        self.inner.insert(claim).await
    }

    async fn count_all(&self) -> claim_lifecycle::Result<i64> {
        self.inner.count_all().await
    }

    async fn select_random_eligible(
        &self,
        _lane: Lane,
    ) -> claim_lifecycle::Result<Option<OutstandingClaim>> {
        Ok(Some(self.ghost))
    }

    async fn update_status(
        &self,
        quote_id: Uuid,
        status: ClaimStatus,
        claim_cost: Option<i32>,
    ) -> claim_lifecycle::Result<u64> {
        self.inner.update_status(quote_id, status, claim_cost).await
    }

    async fn get(&self, quote_id: Uuid) -> claim_lifecycle::Result<Option<Claim>> {
        self.inner.get(quote_id).await
    }
}

#[tokio::test]
async fn updating_an_unknown_claim_aborts() {
    let ghost = OutstandingClaim {
        quote_id: Uuid::new_v4(),
        status: ClaimStatus::SUBMITTED,
    };
    let store = Arc::new(VanishingClaimStore {
        inner: InMemoryClaimStore::with_seed(2),
        ghost,
    });
    let advancer = LifecycleAdvancer::new(store.clone());
    let mut content = RandomContent::seeded(ReferenceData::default(), 2);

    let result = advancer.advance(Lane::NonMobile, &mut content).await;

    assert!(matches!(
        result,
        Err(SimulatorError::IntegrityViolation { rows_affected: 0, quote_id }) if quote_id == ghost.quote_id
    ));
    assert_eq!(store.count_all().await.unwrap(), 0);
}

#[tokio::test]
async fn identically_seeded_runs_take_the_same_steps() {
    async fn run(seed: u64) -> Vec<(Option<Advancement>, Option<Advancement>, Option<Uuid>)> {
        let store = Arc::new(InMemoryClaimStore::with_seed(seed));
        let content = RandomContent::seeded(ReferenceData::default(), seed);
        let mut scheduler = TickScheduler::new(store, content, settings(5));
        scheduler.seed_if_empty().await.unwrap();

        let mut steps = Vec::new();
        for _ in 0..40 {
            let report = scheduler.run_tick().await.unwrap();
            steps.push((
                report.mobile,
                report.non_mobile,
                report.created.map(|c| c.quote_id),
            ));
        }
        steps
    }

    let first = run(42).await;
    assert_eq!(first, run(42).await);
    assert!(first.iter().any(|(mobile, _, _)| mobile.is_some()));
    assert!(first.iter().any(|(_, non_mobile, _)| non_mobile.is_some()));
    assert_ne!(first, run(43).await);
}

#[tokio::test]
async fn terminal_claims_are_never_selected() {
    let store = Arc::new(InMemoryClaimStore::with_seed(6));
    let mut content = RandomContent::seeded(ReferenceData::default(), 6);
    let claim = ClaimGenerator::new(store.clone())
        .create_claim(Lane::Mobile, &mut content)
        .await
        .unwrap();
    store
        .update_status(claim.quote_id, ClaimStatus::TERMINAL, Some(400))
        .await
        .unwrap();

    let advancer = LifecycleAdvancer::new(store.clone());
    for _ in 0..10 {
        assert!(advancer.advance(Lane::Mobile, &mut content).await.unwrap().is_none());
    }
    let stored = store.get(claim.quote_id).await.unwrap().unwrap();
    assert_eq!(stored.status, ClaimStatus::TERMINAL);
    assert_eq!(stored.claim_cost, Some(400));
}
