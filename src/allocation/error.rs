//! Allocation validation errors.

use std::fmt;

use thiserror::Error;

/// Which side of a transfer an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Source,
    Destination,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Source => "source",
            Side::Destination => "destination",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable discriminator for [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    AmbiguousTargetForm,
    MissingTarget,
    NegativeAmount,
    InvalidDistribution,
    NegativeShare,
    RemainderUsedMoreThanOnce,
    AllocationsExceedTotal,
    AllocationsDoNotSumToTotal,
}

impl ValidationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AmbiguousTargetForm => "ambiguous_target_form",
            Self::MissingTarget => "missing_target",
            Self::NegativeAmount => "negative_amount",
            Self::InvalidDistribution => "invalid_distribution",
            Self::NegativeShare => "negative_share",
            Self::RemainderUsedMoreThanOnce => "remainder_used_more_than_once",
            Self::AllocationsExceedTotal => "allocations_exceed_total",
            Self::AllocationsDoNotSumToTotal => "allocations_do_not_sum_to_total",
        }
    }
}

/// A transfer was rejected before reaching the network.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Both a single counterparty and a counterparty list were set.
    #[error("ambiguous target form: {side} and {side}s cannot both be set")]
    AmbiguousTargetForm { side: Side },

    /// Neither a single counterparty nor a counterparty list was set.
    #[error("missing target: either {side} or {side}s must be set")]
    MissingTarget { side: Side },

    #[error("amount must not be negative, got {amount}")]
    NegativeAmount { amount: f64 },

    #[error("invalid distribution {distribution:?} for {side} {identifier}")]
    InvalidDistribution {
        side: Side,
        identifier: String,
        distribution: String,
    },

    #[error("distribution for {side} {identifier} resolves to a negative share ({share})")]
    NegativeShare {
        side: Side,
        identifier: String,
        share: f64,
    },

    #[error("remainder used more than once: {side} {identifier} repeats \"left\"")]
    RemainderUsedMoreThanOnce { side: Side, identifier: String },

    #[error("{side} allocations exceed total amount: allocated {allocated}, total {amount}")]
    AllocationsExceedTotal {
        side: Side,
        allocated: f64,
        amount: f64,
    },

    #[error("{side} allocations do not sum to total amount: allocated {allocated}, total {amount}")]
    AllocationsDoNotSumToTotal {
        side: Side,
        allocated: f64,
        amount: f64,
    },
}

impl ValidationError {
    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            Self::AmbiguousTargetForm { .. } => ValidationErrorKind::AmbiguousTargetForm,
            Self::MissingTarget { .. } => ValidationErrorKind::MissingTarget,
            Self::NegativeAmount { .. } => ValidationErrorKind::NegativeAmount,
            Self::InvalidDistribution { .. } => ValidationErrorKind::InvalidDistribution,
            Self::NegativeShare { .. } => ValidationErrorKind::NegativeShare,
            Self::RemainderUsedMoreThanOnce { .. } => ValidationErrorKind::RemainderUsedMoreThanOnce,
            Self::AllocationsExceedTotal { .. } => ValidationErrorKind::AllocationsExceedTotal,
            Self::AllocationsDoNotSumToTotal { .. } => ValidationErrorKind::AllocationsDoNotSumToTotal,
        }
    }

    /// The side the error refers to, if any.
    pub fn side(&self) -> Option<Side> {
        match self {
            Self::NegativeAmount { .. } => None,
            Self::AmbiguousTargetForm { side }
            | Self::MissingTarget { side }
            | Self::InvalidDistribution { side, .. }
            | Self::NegativeShare { side, .. }
            | Self::RemainderUsedMoreThanOnce { side, .. }
            | Self::AllocationsExceedTotal { side, .. }
            | Self::AllocationsDoNotSumToTotal { side, .. } => Some(*side),
        }
    }

    /// The offending participant, if the error names one.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::InvalidDistribution { identifier, .. }
            | Self::NegativeShare { identifier, .. }
            | Self::RemainderUsedMoreThanOnce { identifier, .. } => Some(identifier),
            _ => None,
        }
    }
}
