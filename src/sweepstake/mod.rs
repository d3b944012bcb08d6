//! Sweepstake lifecycle: generation, refresh reconciliation, storage.

pub mod generate;
pub mod reconcile;
pub mod store;
pub mod types;

pub use generate::{generate, SweepstakeRequest};
pub use reconcile::{reconcile, refresh_sweepstake, RefreshOutcome};
pub use store::SweepstakeStore;
pub use types::{AssignedSelection, Participant, ProbabilityRecord, Sweepstake, SweepstakeId};
