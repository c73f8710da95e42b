use std::sync::Arc;
use tracing::info;

use crate::{
    claim::{Lane, OutstandingClaim},
    content::RandomContent,
    error::{Result, SimulatorError},
    lifecycle::{Advancement, plan_advancement},
    storage::ClaimStore,
};

/// Picks outstanding claims and moves them one step along the lifecycle.
#[derive(Clone)]
pub struct LifecycleAdvancer {
    store: Arc<dyn ClaimStore>,
}

impl LifecycleAdvancer {
    pub fn new(store: Arc<dyn ClaimStore>) -> Self {
        Self { store }
    }

    /// A random non-terminal claim in `lane`, if there is one.
    pub async fn select_outstanding(&self, lane: Lane) -> Result<Option<OutstandingClaim>> {
        self.store.select_random_eligible(lane).await
    }

    /// Apply the lane's transition policy to `claim` and persist the result.
    ///
    /// `claim` must have been selected from `lane`; the lane is not checked
    /// against the stored source. The update must hit exactly one row,
    /// anything else is an integrity violation.
    pub(crate) async fn apply(
        &self,
        claim: OutstandingClaim,
        lane: Lane,
        content: &mut RandomContent,
    ) -> Result<Advancement> {
        let step = plan_advancement(claim, lane, content).ok_or(
            SimulatorError::TerminalClaimSelected {
                quote_id: claim.quote_id,
            },
        )?;

        if step.skipped {
            info!(quote_id = %step.quote_id, "Skipping claimStatus straight to {}", step.to);
        }

        let rows_affected = self
            .store
            .update_status(step.quote_id, step.to, step.claim_cost)
            .await?;
        if rows_affected != 1 {
            return Err(SimulatorError::IntegrityViolation {
                quote_id: step.quote_id,
                rows_affected,
            });
        }

        match step.claim_cost {
            Some(cost) => info!(
                quote_id = %step.quote_id,
                "Updated claimStatus to {} and claimCost to {}", step.to, cost
            ),
            None => info!(quote_id = %step.quote_id, "Updated claimStatus to {}", step.to),
        }

        Ok(step)
    }

    /// Select one outstanding claim in `lane` and advance it.
    ///
    /// Returns `None` when the lane has nothing left to advance.
    pub async fn advance(
        &self,
        lane: Lane,
        content: &mut RandomContent,
    ) -> Result<Option<Advancement>> {
        let Some(claim) = self.select_outstanding(lane).await? else {
            info!(%lane, "No outstanding {} claims found", lane);
            return Ok(None);
        };

        info!(
            quote_id = %claim.quote_id,
            claim_status = %claim.status,
            "Found {} claim", lane
        );
        self.apply(claim, lane, content).await.map(Some)
    }
}
