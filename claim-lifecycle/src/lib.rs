pub mod advancer;
pub mod claim;
pub mod content;
pub mod error;
pub mod generator;
pub mod lifecycle;
pub mod scheduler;
pub mod storage;
pub mod storage_postgres;

// Re-export commonly used types
pub use advancer::LifecycleAdvancer;
pub use claim::{Claim, ClaimStatus, CustomerProfile, Lane, OutstandingClaim, Source};
pub use content::{RandomContent, ReferenceData};
pub use error::{Result, SimulatorError};
pub use generator::ClaimGenerator;
pub use lifecycle::{Advancement, SideEffect, Transition};
pub use scheduler::{DEFAULT_TICKS_PER_NEW_CLAIM, SchedulerSettings, TickReport, TickScheduler};
pub use storage::{ClaimStore, InMemoryClaimStore};
pub use storage_postgres::PostgresClaimStore;
