#![deny(unsafe_code)]
#![warn(missing_docs)]
//! sdlc-evidence
//!
//! The evidence validator (§4.4): whether a collected [`EvidenceBundle`]
//! demonstrates that a bead's acceptance checks actually ran, in a fixed
//! order (hash binding, manual-check requirement, coverage, per-check
//! exit-code resolution) that never short-circuits — every stage runs and
//! contributes its own errors. Also the staleness invalidator, which acts
//! out-of-band on an already-`validated` bundle whenever the bead or the
//! working tree has drifted since validation.

mod coverage;
mod stale;
mod validate;

pub use coverage::acceptance_coverage_errors;
pub use stale::{apply_invalidation, staleness_reasons};
pub use validate::{evidence_validation_errors, mark_validated};
