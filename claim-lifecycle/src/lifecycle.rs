//! Claim lifecycle transition table.
//!
//! A claim moves through statuses `1..=7`, one step per advancement. Two
//! rules modify the default `+1` step:
//!
//! * non-mobile claims leaving status 2 land on 4 instead of 3 two times
//!   out of three;
//! * the step that lands on status 5 also assigns the claim cost.
//!
//! [`transition`] and [`side_effect`] are pure lookups; randomness is only
//! drawn when a [`Transition`] is resolved against a [`RandomContent`].

use uuid::Uuid;

use crate::claim::{ClaimStatus, Lane, OutstandingClaim};
use crate::content::RandomContent;

const STATUS_TWO: ClaimStatus = ClaimStatus::known(2);
const STATUS_FOUR: ClaimStatus = ClaimStatus::known(4);

/// Outgoing edge of a non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Move to the given status.
    Advance(ClaimStatus),
    /// Land on `landing`, or with probability 2/3 on `skip_to`.
    MaySkip {
        landing: ClaimStatus,
        skip_to: ClaimStatus,
    },
}

impl Transition {
    /// Draws the skip decision if there is one and returns the new status
    /// together with whether the skip was taken.
    pub fn resolve(self, content: &mut RandomContent) -> (ClaimStatus, bool) {
        match self {
            Transition::Advance(next) => (next, false),
            Transition::MaySkip { landing, skip_to } => {
                if content.skip_status_three() {
                    (skip_to, true)
                } else {
                    (landing, false)
                }
            }
        }
    }
}

/// Extra work done when a claim lands on a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    None,
    AssignCost,
}

/// Looks up the outgoing transition for a claim at `current` in `lane`.
/// Terminal claims have none.
pub fn transition(lane: Lane, current: ClaimStatus) -> Option<Transition> {
    let next = current.next()?;
    match lane {
        Lane::NonMobile if current == STATUS_TWO => Some(Transition::MaySkip {
            landing: next,
            skip_to: STATUS_FOUR,
        }),
        _ => Some(Transition::Advance(next)),
    }
}

pub fn side_effect(next: ClaimStatus) -> SideEffect {
    if next == ClaimStatus::COSTED {
        SideEffect::AssignCost
    } else {
        SideEffect::None
    }
}

/// A single resolved status step for one claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advancement {
    pub quote_id: Uuid,
    pub from: ClaimStatus,
    pub to: ClaimStatus,
    pub claim_cost: Option<i32>,
    pub skipped: bool,
}

/// Resolves the next step for `claim`, or `None` if it is terminal.
pub fn plan_advancement(
    claim: OutstandingClaim,
    lane: Lane,
    content: &mut RandomContent,
) -> Option<Advancement> {
    let (to, skipped) = transition(lane, claim.status)?.resolve(content);
    let claim_cost = match side_effect(to) {
        SideEffect::AssignCost => Some(content.claim_cost()),
        SideEffect::None => None,
    };

    Some(Advancement {
        quote_id: claim.quote_id,
        from: claim.status,
        to,
        claim_cost,
        skipped,
    })
}
