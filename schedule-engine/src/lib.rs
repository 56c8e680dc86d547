//! Transit schedule calendar normalization and validation.
//!
//! Calendars arrive as loosely related day types, assignments and
//! operating periods; [`calendar`] turns them into canonical timetables.
//! [`validation`] then checks journeys, frequencies and interchanges held
//! in a [`domain::Referential`] and reports findings per checkpoint.

pub mod calendar;
pub mod domain;
pub mod validation;
