//! Fatal validation errors.

use crate::domain::ObjectId;

/// A reference the validator cannot resolve at all.
///
/// Data-quality findings are reported as diagnostics; these errors mean the
/// referential is structurally incomplete and the run is abandoned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("journey {journey} passes unknown stop point {stop_point}")]
    UnknownStopPoint {
        journey: ObjectId,
        stop_point: ObjectId,
    },

    #[error("journey {journey} follows unknown journey pattern {pattern}")]
    UnknownJourneyPattern { journey: ObjectId, pattern: ObjectId },
}
