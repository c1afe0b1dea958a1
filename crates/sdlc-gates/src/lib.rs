#![deny(unsafe_code)]
#![warn(missing_docs)]
//! sdlc-gates
//!
//! Per-edge gating predicates (§4.3): one module per lifecycle edge that
//! carries a gate, each exposing a pure, file-system-free `evaluate(...)`
//! that collects every independent check into a `Vec<String>` of error
//! lines rather than short-circuiting on the first failure. `sdlc-engine`
//! loads whatever each gate's input struct needs from disk and dispatches
//! to the right module for the edge being attempted.

/// `sized -> ready`: adopts the reviewed acceptance checks and freezes a
/// snapshot of them.
pub mod sized_ready;
/// `ready -> in_progress`: acceptance-freeze, dependency, openspec,
/// grounding, exception-profile, and (discovery beads) discovery-policy
/// checks.
pub mod ready_in_progress;
/// `verification_pending -> verified`: evidence validation plus boundary
/// enforcement.
pub mod verification_verified;
/// `approval_pending -> done`: approval decision-ledger check.
pub mod approval_done;
/// The acceptance-checks snapshot frozen at `ready` and checked at
/// `ready -> in_progress`.
pub mod snapshot;

pub use approval_done::evaluate as evaluate_approval_to_done;
pub use ready_in_progress::{DependencyStatus, ReadyToInProgressInput, evaluate as evaluate_ready_to_in_progress};
pub use sized_ready::{SizedToReadyOutcome, evaluate as evaluate_sized_to_ready};
pub use snapshot::ReadyAcceptanceSnapshot;
pub use verification_verified::{VerificationToVerifiedInput, evaluate as evaluate_verification_to_verified};
