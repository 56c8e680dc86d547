//! Inclusive date ranges and validity windows.
//!
//! A [`Period`] is a closed range of operating dates that can never be
//! inverted. A [`ValidityWindow`] is the looser "valid between" declaration
//! found on calendar frames and day types, where either bound may be absent.
//! Which window applies to a given calendar contribution is decided by a
//! [`ValidityResolutionChain`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::TemporalError;

/// An inclusive range of dates, `from <= to` by construction.
///
/// # Examples
///
/// ```
/// use schedule_engine::domain::Period;
/// use chrono::NaiveDate;
///
/// let jan = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
/// let period = Period::new(jan(1), jan(7)).unwrap();
/// assert_eq!(period.days().count(), 7);
/// assert!(period.contains(jan(7)));
///
/// assert!(Period::new(jan(7), jan(1)).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod", into = "RawPeriod")]
pub struct Period {
    from: NaiveDate,
    to: NaiveDate,
}

impl Period {
    /// Create a period, rejecting inverted ranges.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, TemporalError> {
        if from > to {
            return Err(TemporalError::InvertedRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// A period covering exactly one date.
    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            from: date,
            to: date,
        }
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Number of dates in the period.
    pub fn len_days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    /// Iterate every date of the period in order.
    pub fn days(&self) -> DateIter {
        DateIter {
            next: Some(self.from),
            end_inclusive: self.to,
        }
    }

    /// Restrict the period to a validity window.
    ///
    /// Returns `None` when the period lies wholly outside the window, and
    /// otherwise the period with whichever bounds exceed the window clamped.
    pub fn clip_to(&self, window: &ValidityWindow) -> Option<Self> {
        let from = match window.from() {
            Some(lower) => self.from.max(lower),
            None => self.from,
        };
        let to = match window.to() {
            Some(upper) => self.to.min(upper),
            None => self.to,
        };
        Period::new(from, to).ok()
    }
}

impl fmt::Debug for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Period({}..={})", self.from, self.to)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.from, self.to)
    }
}

#[derive(Serialize, Deserialize)]
struct RawPeriod {
    from: NaiveDate,
    to: NaiveDate,
}

impl TryFrom<RawPeriod> for Period {
    type Error = TemporalError;

    fn try_from(raw: RawPeriod) -> Result<Self, Self::Error> {
        Period::new(raw.from, raw.to)
    }
}

impl From<Period> for RawPeriod {
    fn from(period: Period) -> Self {
        RawPeriod {
            from: period.from,
            to: period.to,
        }
    }
}

/// Iterator over consecutive dates, both ends inclusive.
#[derive(Debug, Clone)]
pub struct DateIter {
    next: Option<NaiveDate>,
    end_inclusive: NaiveDate,
}

impl Iterator for DateIter {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        if current > self.end_inclusive {
            self.next = None;
            return None;
        }
        self.next = current.succ_opt();
        Some(current)
    }
}

/// A "valid between" declaration with optional bounds.
///
/// Bounds are dates; any time-of-day carried by the source declaration is
/// dropped before a window is built. Both bounds are inclusive.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWindow", into = "RawWindow")]
pub struct ValidityWindow {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl ValidityWindow {
    /// Create a window, rejecting `from > to` when both are present.
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self, TemporalError> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(TemporalError::InvertedRange { from, to });
            }
        }
        Ok(Self { from, to })
    }

    /// Window with both bounds present.
    pub fn between(from: NaiveDate, to: NaiveDate) -> Result<Self, TemporalError> {
        Self::new(Some(from), Some(to))
    }

    /// Window with no bounds; admits every date.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn from(&self) -> Option<NaiveDate> {
        self.from
    }

    pub fn to(&self) -> Option<NaiveDate> {
        self.to
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn has_both_bounds(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }

    /// True when `date` lies inside the window. A missing bound admits
    /// everything on its side.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| from <= date) && self.to.is_none_or(|to| date <= to)
    }
}

impl fmt::Debug for ValidityWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |d: Option<NaiveDate>| d.map_or_else(|| "..".to_string(), |d| d.to_string());
        write!(f, "ValidityWindow({} / {})", bound(self.from), bound(self.to))
    }
}

#[derive(Serialize, Deserialize)]
struct RawWindow {
    #[serde(default)]
    from: Option<NaiveDate>,
    #[serde(default)]
    to: Option<NaiveDate>,
}

impl TryFrom<RawWindow> for ValidityWindow {
    type Error = TemporalError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        ValidityWindow::new(raw.from, raw.to)
    }
}

impl From<ValidityWindow> for RawWindow {
    fn from(window: ValidityWindow) -> Self {
        RawWindow {
            from: window.from,
            to: window.to,
        }
    }
}

/// Ordered candidate windows; the first present one applies.
///
/// Calendar contributions are constrained by the most specific declaration
/// that carries a window: the day type itself, then the enclosing service
/// calendar, the calendar frame and finally the composite frame. When no
/// candidate is present the contribution is unconstrained.
///
/// # Examples
///
/// ```
/// use schedule_engine::domain::{ValidityResolutionChain, ValidityWindow};
/// use chrono::NaiveDate;
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
/// let frame = ValidityWindow::between(d(1, 1), d(12, 31)).unwrap();
///
/// let chain = ValidityResolutionChain::new().then(None).then(Some(frame));
/// assert_eq!(chain.resolve(), frame);
/// assert!(ValidityResolutionChain::new().resolve().is_unbounded());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidityResolutionChain {
    candidates: Vec<Option<ValidityWindow>>,
}

impl ValidityResolutionChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next, less specific candidate.
    pub fn then(mut self, candidate: Option<ValidityWindow>) -> Self {
        self.candidates.push(candidate);
        self
    }

    /// Returns the first present candidate, or an unbounded window.
    pub fn resolve(&self) -> ValidityWindow {
        self.candidates
            .iter()
            .flatten()
            .next()
            .copied()
            .unwrap_or_default()
    }
}
