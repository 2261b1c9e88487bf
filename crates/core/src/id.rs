//! Identifiers handed out by the backend services.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a user (actor identity), as issued by the identity service.
///
/// The client never interprets it. The identity service currently hands out
/// numeric ids, but textual ids are carried through untouched so the value
/// round-trips to storage in the exact JSON form it arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Repr);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
enum Repr {
    Number(i64),
    Text(String),
}

impl UserId {
    /// Numeric view of the id, if the backend issued a number.
    pub fn as_i64(&self) -> Option<i64> {
        match &self.0 {
            Repr::Number(n) => Some(*n),
            Repr::Text(_) => None,
        }
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.0 {
            Repr::Number(n) => write!(f, "{n}"),
            Repr::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(Repr::Number(value))
    }
}

impl From<i32> for UserId {
    fn from(value: i32) -> Self {
        Self(Repr::Number(i64::from(value)))
    }
}

impl FromStr for UserId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::invalid_id("UserId: empty"));
        }
        Ok(match s.parse::<i64>() {
            Ok(n) => Self(Repr::Number(n)),
            Err(_) => Self(Repr::Text(s.to_string())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_round_trip_as_json_numbers() {
        let id: UserId = serde_json::from_str("42").unwrap();
        assert_eq!(id.as_i64(), Some(42));
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
    }

    #[test]
    fn textual_ids_are_kept_verbatim() {
        let id: UserId = serde_json::from_str("\"u-17\"").unwrap();
        assert_eq!(id.as_i64(), None);
        assert_eq!(id.to_string(), "u-17");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"u-17\"");
    }

    #[test]
    fn parse_prefers_numbers_and_rejects_blank() {
        assert_eq!("7".parse::<UserId>().unwrap(), UserId::from(7));
        assert_eq!("abc".parse::<UserId>().unwrap().to_string(), "abc");
        assert!(matches!(" ".parse::<UserId>(), Err(DomainError::InvalidId(_))));
    }
}
