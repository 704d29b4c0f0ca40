//! Product condition as listed by vendors.

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown [`Condition`] label.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid condition: {0:?} (expected \"nuevo\" or \"usado\")")]
pub struct ConditionError(String);

/// Whether a listed product is brand new or second-hand.
///
/// The marketplace API and the catalog query string use the Spanish labels
/// `nuevo` and `usado`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "nuevo")]
    New,
    #[serde(rename = "usado")]
    Used,
}

impl Condition {
    /// Wire label used by the API and in query strings.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "nuevo",
            Self::Used => "usado",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Condition {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "nuevo" => Ok(Self::New),
            "usado" => Ok(Self::Used),
            other => Err(ConditionError(other.to_owned())),
        }
    }
}
