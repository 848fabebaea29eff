//! Distribution specifiers for multi-party transfers.
//!
//! # Syntax
//! - `"5.5%"` → percentage of the transfer amount
//! - `"2000000.00"` → fixed amount
//! - `"left"` → whatever remains after every other allocation
//!
//! Anything else is invalid and is rejected by the validator before any
//! share is computed.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Literal used for the remainder sentinel.
pub const REMAINDER: &str = "left";

static PERCENTAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)%$").expect("percentage pattern is valid"));

static FIXED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)$").expect("fixed amount pattern is valid"));

/// The interpretation of a well-formed distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistributionKind {
    /// Percentage of the total, e.g. `5.5` for `"5.5%"`.
    Percentage(f64),
    /// Literal amount.
    FixedAmount(f64),
    /// Remainder of the total after all other allocations.
    Remainder,
}

/// How much of a transfer a single participant receives.
///
/// Kept as the raw string so that malformed values are representable and
/// round-trip through JSON unchanged; use [`Distribution::classify`] to
/// interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distribution(String);

impl Distribution {
    /// Wrap a raw distribution string without checking it.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// A percentage distribution, e.g. `Distribution::percent(5.5)` → `"5.5%"`.
    pub fn percent(value: f64) -> Self {
        Self(format!("{}%", value))
    }

    /// A fixed amount distribution.
    pub fn fixed(value: f64) -> Self {
        Self(value.to_string())
    }

    /// The remainder sentinel.
    pub fn remainder() -> Self {
        Self(REMAINDER.to_string())
    }

    /// Raw string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classify the distribution. Returns `None` for malformed values.
    ///
    /// The numeric value is taken from the same capture that matched, so a
    /// well-formed value always yields a number.
    pub fn classify(&self) -> Option<DistributionKind> {
        let raw = self.0.as_str();
        if raw == REMAINDER {
            return Some(DistributionKind::Remainder);
        }
        if let Some(value) = capture_number(&PERCENTAGE_RE, raw) {
            return Some(DistributionKind::Percentage(value));
        }
        capture_number(&FIXED_RE, raw).map(DistributionKind::FixedAmount)
    }

    pub fn is_valid(&self) -> bool {
        self.classify().is_some()
    }

    pub fn is_percentage(&self) -> bool {
        matches!(self.classify(), Some(DistributionKind::Percentage(_)))
    }

    pub fn is_fixed_amount(&self) -> bool {
        matches!(self.classify(), Some(DistributionKind::FixedAmount(_)))
    }

    pub fn is_remainder(&self) -> bool {
        self.0 == REMAINDER
    }
}

fn capture_number(re: &Regex, raw: &str) -> Option<f64> {
    re.captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Distribution {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Distribution {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Distribution {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}
