use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Address;

/// The lifecycle states of a royalty configuration attached to a minted asset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoyaltyStatus {
    /// No configuration has been submitted for this asset yet.
    #[default]
    Unset,
    /// A configuration transaction has been submitted and its hash persisted.
    Submitted,
    /// The configuration transaction confirmed on chain.
    Confirmed,
    /// The configuration transaction reverted. Recoverable by resubmission.
    ConfigFailed,
}

impl RoyaltyStatus {
    /// A configuration may be overwritten and resubmitted any number of times
    /// until it confirms.
    pub const fn allows_resubmission(self) -> bool {
        !matches!(self, Self::Confirmed)
    }
}

impl fmt::Display for RoyaltyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unset => "unset",
            Self::Submitted => "submitted",
            Self::Confirmed => "confirmed",
            Self::ConfigFailed => "config_failed",
        })
    }
}

/// One beneficiary line of a royalty split, as entered in the admin form.
///
/// The address is kept as raw text here; it is validated when the
/// configuration is submitted, so that a typo surfaces as a configuration
/// error rather than a deserialization failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoyaltyRecipient {
    pub address: String,
    /// This recipient's share of the royalty, as a percentage of the whole
    /// split. The shares across all recipients must sum to exactly 100.
    pub percent: f64,
}

impl RoyaltyRecipient {
    pub fn new(address: impl Into<String>, percent: f64) -> Self {
        Self {
            address: address.into(),
            percent,
        }
    }
}

/// A royalty configuration for a minted asset, as produced by the admin form.
///
/// `beneficiary_total` and `total_percent` are deliberately two separate
/// figures: the first is the form-declared sum of the recipient shares, the
/// second is the on-chain total royalty percentage parameter. Both are
/// validated independently before any ledger call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoyaltyConfiguration {
    pub recipients: Vec<RoyaltyRecipient>,
    /// The form-declared sum of recipient shares. Must equal exactly 100.
    pub beneficiary_total: f64,
    /// The on-chain total royalty percentage. Must be in (0, 100]; values
    /// below 100 allocate only part of the allowed royalty.
    pub total_percent: f64,
    /// The token the configuration targets.
    pub token_id: u64,
    /// The royalty contract associated with the asset's collection.
    pub contract_address: Address,
    pub status: RoyaltyStatus,
}

impl RoyaltyConfiguration {
    pub fn new(
        recipients: Vec<RoyaltyRecipient>,
        beneficiary_total: f64,
        total_percent: f64,
        token_id: u64,
        contract_address: Address,
    ) -> Self {
        Self {
            recipients,
            beneficiary_total,
            total_percent,
            token_id,
            contract_address,
            status: RoyaltyStatus::Unset,
        }
    }
}
