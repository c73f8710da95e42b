//! TickScheduler – drives the simulation loop.
//!
//! On startup an empty store is seeded with mobile claims. After that every
//! tick advances one mobile and one non-mobile claim, and every
//! `ticks_per_new_claim` ticks a new non-mobile claim is created.
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use claim_lifecycle::{InMemoryClaimStore, RandomContent, ReferenceData, SchedulerSettings, TickScheduler};
//! # async fn demo() -> claim_lifecycle::Result<()> {
//! let store = Arc::new(InMemoryClaimStore::new());
//! let content = RandomContent::from_entropy(ReferenceData::default());
//! let scheduler = TickScheduler::new(store, content, SchedulerSettings::default());
//! scheduler.run().await
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::{
    advancer::LifecycleAdvancer,
    claim::{Claim, Lane},
    content::RandomContent,
    error::Result,
    generator::ClaimGenerator,
    lifecycle::Advancement,
    storage::ClaimStore,
};

/// Number of ticks between new non-mobile claims
pub const DEFAULT_TICKS_PER_NEW_CLAIM: u32 = 3;

#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// Pause before each tick
    pub tick_interval: Duration,
    /// Mobile claims created when the store starts out empty
    pub seed_claims: u32,
    pub ticks_per_new_claim: u32,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(1000),
            seed_claims: 3,
            ticks_per_new_claim: DEFAULT_TICKS_PER_NEW_CLAIM,
        }
    }
}

/// What happened during one tick
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: u64,
    pub mobile: Option<Advancement>,
    pub non_mobile: Option<Advancement>,
    pub created: Option<Claim>,
}

pub struct TickScheduler {
    store: Arc<dyn ClaimStore>,
    generator: ClaimGenerator,
    advancer: LifecycleAdvancer,
    content: RandomContent,
    settings: SchedulerSettings,
    ticks_to_next_claim: u32,
    tick: u64,
}

impl TickScheduler {
    pub fn new(
        store: Arc<dyn ClaimStore>,
        content: RandomContent,
        settings: SchedulerSettings,
    ) -> Self {
        let settings = SchedulerSettings {
            ticks_per_new_claim: settings.ticks_per_new_claim.max(1),
            ..settings
        };

        Self {
            generator: ClaimGenerator::new(store.clone()),
            advancer: LifecycleAdvancer::new(store.clone()),
            store,
            content,
            ticks_to_next_claim: settings.ticks_per_new_claim,
            settings,
            tick: 0,
        }
    }

    /// Seed the configured number of mobile claims if the store holds no
    /// claims at all. Returns how many were created.
    pub async fn seed_if_empty(&mut self) -> Result<usize> {
        let count = self.store.count_all().await?;
        if count > 0 {
            info!("Found {} quotes in table", count);
            return Ok(0);
        }

        info!(
            "No quotes in table, creating {} new mobile quotes",
            self.settings.seed_claims
        );
        for _ in 0..self.settings.seed_claims {
            self.generator
                .create_claim(Lane::Mobile, &mut self.content)
                .await?;
        }
        Ok(self.settings.seed_claims as usize)
    }

    /// Run a single tick without sleeping.
    pub async fn run_tick(&mut self) -> Result<TickReport> {
        self.tick += 1;
        debug!(tick = self.tick, "Starting tick");

        let mobile = self.advancer.advance(Lane::Mobile, &mut self.content).await?;
        let non_mobile = self
            .advancer
            .advance(Lane::NonMobile, &mut self.content)
            .await?;

        self.ticks_to_next_claim = self.ticks_to_next_claim.saturating_sub(1);
        let created = if self.ticks_to_next_claim == 0 {
            self.ticks_to_next_claim = self.settings.ticks_per_new_claim;
            Some(
                self.generator
                    .create_claim(Lane::NonMobile, &mut self.content)
                    .await?,
            )
        } else {
            None
        };

        Ok(TickReport {
            tick: self.tick,
            mobile,
            non_mobile,
            created,
        })
    }

    /// Seed if needed, then tick forever. Only returns on the first error.
    pub async fn run(mut self) -> Result<()> {
        self.seed_if_empty().await?;

        loop {
            tokio::time::sleep(self.settings.tick_interval).await;
            self.run_tick().await?;
        }
    }

    pub fn ticks_to_next_claim(&self) -> u32 {
        self.ticks_to_next_claim
    }
}
