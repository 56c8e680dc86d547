//! Object identifier type.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use super::InvalidObjectId;

/// Identifier of a referential object, such as `"NSR:StopPlace:42"`.
///
/// Identifiers are non-empty and contain no whitespace. The text before the
/// first `:` is the codespace that names which referential owns the object.
///
/// # Examples
///
/// ```
/// use schedule_engine::domain::ObjectId;
///
/// let id = ObjectId::parse("RUT:ServiceJourney:1").unwrap();
/// assert_eq!(id.codespace(), "RUT");
///
/// assert!(ObjectId::parse("").is_err());
/// assert!(ObjectId::parse("RUT:Line 1").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    pub fn parse(s: &str) -> Result<Self, InvalidObjectId> {
        if s.is_empty() {
            return Err(InvalidObjectId {
                reason: "must not be empty",
            });
        }
        if s.chars().any(char::is_whitespace) {
            return Err(InvalidObjectId {
                reason: "must not contain whitespace",
            });
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The owning codespace: everything before the first `:`, or the whole
    /// id when it has no separator.
    pub fn codespace(&self) -> &str {
        match self.0.split_once(':') {
            Some((prefix, _)) => prefix,
            None => &self.0,
        }
    }

    /// True when the id belongs to the given codespace.
    pub fn is_in_codespace(&self, codespace: &str) -> bool {
        self.codespace() == codespace
    }
}

impl TryFrom<String> for ObjectId {
    type Error = InvalidObjectId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl Borrow<str> for ObjectId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
