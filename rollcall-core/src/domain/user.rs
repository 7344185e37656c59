//! User record and identity key domain models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::result::Error;

/// Registration timestamp used as a stable identity across username changes.
///
/// The forum reports registration dates either as whole seconds or as
/// fractional seconds, so both representations are kept as-is. Comparison is
/// numeric: `Int(100)` equals `Float(100.0)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdentityKey {
    Int(i64),
    Float(f64),
}

impl IdentityKey {
    /// Numeric value in seconds
    pub fn as_f64(&self) -> f64 {
        match *self {
            IdentityKey::Int(v) => v as f64,
            IdentityKey::Float(v) => v,
        }
    }

    /// Whole seconds elapsed between this timestamp and `now`, truncated
    /// toward zero. Negative when the timestamp lies in the future.
    pub fn age_at(&self, now: i64) -> i64 {
        match *self {
            IdentityKey::Int(v) => now.saturating_sub(v),
            IdentityKey::Float(v) => (now as f64 - v) as i64,
        }
    }
}

impl PartialEq for IdentityKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (IdentityKey::Int(a), IdentityKey::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl From<i64> for IdentityKey {
    fn from(v: i64) -> Self {
        IdentityKey::Int(v)
    }
}

impl From<f64> for IdentityKey {
    fn from(v: f64) -> Self {
        IdentityKey::Float(v)
    }
}

impl FromStr for IdentityKey {
    type Err = Error;

    /// Integer first, fractional as a fallback
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(v) = s.parse::<i64>() {
            return Ok(IdentityKey::Int(v));
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(IdentityKey::Float(v)),
            _ => Err(Error::snapshot(format!("invalid identity key '{}'", s))),
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKey::Int(v) => write!(f, "{}", v),
            // Debug keeps the trailing ".0" on integral values so they reload as fractional
            IdentityKey::Float(v) => write!(f, "{:?}", v),
        }
    }
}

/// A forum member as reported by the `userlist` operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "name")]
    pub username: String,
    #[serde(rename = "regdate")]
    pub identity_key: IdentityKey,
}

impl UserRecord {
    pub fn new(username: impl Into<String>, identity_key: impl Into<IdentityKey>) -> Self {
        Self {
            username: username.into(),
            identity_key: identity_key.into(),
        }
    }
}
