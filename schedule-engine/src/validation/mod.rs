//! Schedule validation.
//!
//! The [`Validator`] runs a battery of independent checkpoints over a
//! [`Referential`](crate::domain::Referential): passing-time sanity, running
//! speeds, running-time consistency between journeys, frequency windows,
//! transport-mode compatibility and interchange feasibility. Findings are
//! pushed to a [`DiagnosticReporter`] supplied by the caller.

mod config;
mod diagnostic;
mod distance;
mod error;
mod frequency;
mod interchange;
mod journey_checks;
mod session;
mod variance;

#[cfg(test)]
mod fixtures;
#[cfg(test)]
mod validator_tests;

pub use config::{ConfigError, ModeParameters, ValidationConfig};
pub use diagnostic::{
    CheckPoint, CheckPointStatus, DataLocation, Diagnostic, DiagnosticReporter, ObjectKind,
    Severity, ValidationReport,
};
pub use distance::DistanceCache;
pub use error::ValidationError;
pub use session::{ValidationSummary, Validator};
