//! Multi-party allocation validation.
//!
//! # Responsibilities
//! - Enforce exactly one target form (single counterparty or list) per side
//! - Reject negative amounts
//! - Resolve every participant's share and check the shares sum to the amount
//!
//! # Numeric semantics
//! Shares are computed in `f64`. The default comparison is exact equality,
//! which is fragile for splits producing non-terminating binary fractions
//! (`0.1 + 0.2 != 0.3`). [`AmountComparison::Epsilon`] and
//! [`AmountComparison::MinorUnits`] are explicit opt-ins.

use serde::{Deserialize, Serialize};

use crate::allocation::distribution::{Distribution, DistributionKind};
use crate::allocation::error::{Side, ValidationError};
use crate::observability::metrics;

/// A participant in a multi-party transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationTarget {
    /// Balance ID or indicator (e.g. `"@alice"`).
    pub identifier: String,
    pub distribution: Distribution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration: Option<String>,
}

impl AllocationTarget {
    pub fn new(identifier: impl Into<String>, distribution: impl Into<Distribution>) -> Self {
        Self {
            identifier: identifier.into(),
            distribution: distribution.into(),
            narration: None,
        }
    }

    pub fn with_narration(mut self, narration: impl Into<String>) -> Self {
        self.narration = Some(narration.into());
        self
    }
}

/// One side of a transfer as supplied by the caller.
///
/// An empty `single` string and an empty `multiple` slice both count as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SideSpec<'a> {
    pub single: Option<&'a str>,
    pub multiple: &'a [AllocationTarget],
}

impl<'a> SideSpec<'a> {
    pub fn single(identifier: &'a str) -> Self {
        Self {
            single: Some(identifier),
            multiple: &[],
        }
    }

    pub fn split(targets: &'a [AllocationTarget]) -> Self {
        Self {
            single: None,
            multiple: targets,
        }
    }
}

/// The validator's view of a transfer request.
#[derive(Debug, Clone, Copy)]
pub struct TransferIntent<'a> {
    pub amount: f64,
    /// Scale factor between the amount and its minor units (e.g. 100 for cents).
    pub precision: i64,
    pub source: SideSpec<'a>,
    pub destination: SideSpec<'a>,
}

/// How the final allocated total is compared against the amount.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AmountComparison {
    /// Bit-for-bit `f64` equality.
    #[default]
    Exact,
    /// Absolute difference within the given tolerance.
    Epsilon(f64),
    /// Equality after scaling by the intent's precision and rounding to integers.
    MinorUnits,
}

impl AmountComparison {
    fn matches(&self, allocated: f64, amount: f64, precision: i64) -> bool {
        match *self {
            AmountComparison::Exact => allocated == amount,
            AmountComparison::Epsilon(epsilon) => (allocated - amount).abs() <= epsilon.abs(),
            AmountComparison::MinorUnits => {
                let scale = if precision > 0 { precision as f64 } else { 1.0 };
                (allocated * scale).round() == (amount * scale).round()
            }
        }
    }
}

/// A participant's resolved numeric share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedShare {
    pub identifier: String,
    pub share: f64,
    #[serde(skip)]
    pub kind: DistributionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narration: Option<String>,
}

/// The resolved allocation for one side of a transfer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedSide {
    /// A single counterparty receives (or pays) the whole amount.
    Single { identifier: String, share: f64 },
    /// Shares in input order.
    Split(Vec<ResolvedShare>),
}

impl ResolvedSide {
    /// Share of the given participant. For splits naming the same
    /// participant more than once, the shares are added.
    pub fn share_of(&self, identifier: &str) -> Option<f64> {
        match self {
            ResolvedSide::Single { identifier: id, share } => (id == identifier).then_some(*share),
            ResolvedSide::Split(shares) => shares
                .iter()
                .filter(|s| s.identifier == identifier)
                .map(|s| s.share)
                .reduce(|a, b| a + b),
        }
    }

    pub fn total(&self) -> f64 {
        match self {
            ResolvedSide::Single { share, .. } => *share,
            ResolvedSide::Split(shares) => shares.iter().map(|s| s.share).sum(),
        }
    }

    pub fn is_split(&self) -> bool {
        matches!(self, ResolvedSide::Split(_))
    }
}

/// A fully validated transfer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedAllocation {
    pub amount: f64,
    pub source: ResolvedSide,
    pub destination: ResolvedSide,
}

enum TargetForm<'a> {
    Single(&'a str),
    Split(&'a [AllocationTarget]),
}

/// Validates transfers and resolves participant shares.
///
/// Stateless apart from its comparison mode; share one instance freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationValidator {
    comparison: AmountComparison,
}

impl AllocationValidator {
    /// A validator using exact equality.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_comparison(comparison: AmountComparison) -> Self {
        Self { comparison }
    }

    pub fn comparison(&self) -> AmountComparison {
        self.comparison
    }

    /// Validate a transfer. The first violated rule is reported.
    pub fn validate(&self, intent: &TransferIntent<'_>) -> Result<ResolvedAllocation, ValidationError> {
        let result = self.resolve(intent);
        if let Err(err) = &result {
            metrics::record_allocation_rejected(err.kind());
            tracing::debug!(
                reason = err.kind().as_str(),
                side = ?err.side(),
                identifier = ?err.identifier(),
                "Transfer rejected by allocation validator"
            );
        }
        result
    }

    fn resolve(&self, intent: &TransferIntent<'_>) -> Result<ResolvedAllocation, ValidationError> {
        let source_form = target_form(Side::Source, &intent.source)?;
        let destination_form = target_form(Side::Destination, &intent.destination)?;

        // Negated comparison so NaN is rejected too.
        if !(intent.amount >= 0.0) {
            return Err(ValidationError::NegativeAmount {
                amount: intent.amount,
            });
        }

        let source = self.resolve_side(Side::Source, source_form, intent)?;
        let destination = self.resolve_side(Side::Destination, destination_form, intent)?;

        Ok(ResolvedAllocation {
            amount: intent.amount,
            source,
            destination,
        })
    }

    fn resolve_side(
        &self,
        side: Side,
        form: TargetForm<'_>,
        intent: &TransferIntent<'_>,
    ) -> Result<ResolvedSide, ValidationError> {
        match form {
            TargetForm::Single(identifier) => Ok(ResolvedSide::Single {
                identifier: identifier.to_string(),
                share: intent.amount,
            }),
            TargetForm::Split(targets) => self
                .resolve_split(side, targets, intent.amount, intent.precision)
                .map(ResolvedSide::Split),
        }
    }

    fn resolve_split(
        &self,
        side: Side,
        targets: &[AllocationTarget],
        amount: f64,
        precision: i64,
    ) -> Result<Vec<ResolvedShare>, ValidationError> {
        let mut shares = Vec::with_capacity(targets.len());
        let mut total = 0.0;
        let mut remainder_at: Option<usize> = None;

        for target in targets {
            let kind = target.distribution.classify().ok_or_else(|| {
                ValidationError::InvalidDistribution {
                    side,
                    identifier: target.identifier.clone(),
                    distribution: target.distribution.to_string(),
                }
            })?;

            let share = match kind {
                DistributionKind::Percentage(percentage) => amount * (percentage / 100.0),
                DistributionKind::FixedAmount(value) => value,
                DistributionKind::Remainder => {
                    if remainder_at.is_some() {
                        return Err(ValidationError::RemainderUsedMoreThanOnce {
                            side,
                            identifier: target.identifier.clone(),
                        });
                    }
                    remainder_at = Some(shares.len());
                    0.0
                }
            };

            if share < 0.0 {
                return Err(ValidationError::NegativeShare {
                    side,
                    identifier: target.identifier.clone(),
                    share,
                });
            }
            total += share;

            shares.push(ResolvedShare {
                identifier: target.identifier.clone(),
                share,
                kind,
                narration: target.narration.clone(),
            });
        }

        if let Some(index) = remainder_at {
            let left = amount - total;
            if left < 0.0 {
                return Err(ValidationError::AllocationsExceedTotal {
                    side,
                    allocated: total,
                    amount,
                });
            }
            shares[index].share = left;
            total += left;
        }

        if !self.comparison.matches(total, amount, precision) {
            return Err(ValidationError::AllocationsDoNotSumToTotal {
                side,
                allocated: total,
                amount,
            });
        }

        Ok(shares)
    }
}

fn target_form<'a>(side: Side, spec: &SideSpec<'a>) -> Result<TargetForm<'a>, ValidationError> {
    let single = spec.single.filter(|s| !s.is_empty());
    match (single, spec.multiple.is_empty()) {
        (Some(_), false) => Err(ValidationError::AmbiguousTargetForm { side }),
        (None, true) => Err(ValidationError::MissingTarget { side }),
        (Some(identifier), true) => Ok(TargetForm::Single(identifier)),
        (None, false) => Ok(TargetForm::Split(spec.multiple)),
    }
}
