use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Address, ContentId, RoyaltyStatus, TxHash};

/// The lifecycle states of an asset record.
///
/// Transitions are monotonic: a record never moves backwards, with two
/// exceptions around mint failure. A submitted mint whose transaction reverts
/// moves to [`MintFailed`](Self::MintFailed), and a failed mint can be retried,
/// which moves it forward through [`MintSubmitted`](Self::MintSubmitted) again.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    /// The record exists but off-chain metadata assembly has not completed.
    #[default]
    Draft,
    /// All content identifiers are uploaded and the record is ready to mint.
    MetadataReady,
    /// A mint transaction has been submitted and its hash persisted, but the
    /// ledger has not confirmed it yet.
    MintSubmitted,
    /// The mint transaction confirmed and the token identifier is recorded.
    Minted,
    /// The mint transaction reverted on chain. Recoverable by manual retry.
    MintFailed,
}

impl AssetStatus {
    /// Whether a mint attempt may start from this state.
    pub const fn is_mintable(self) -> bool {
        matches!(self, Self::MetadataReady | Self::MintFailed)
    }

    /// Whether this is a state no automatic transition ever leaves.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Minted)
    }

    /// The legal transition table for asset records.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::MetadataReady)
                | (Self::MetadataReady, Self::MintSubmitted)
                | (Self::MintSubmitted, Self::Minted)
                | (Self::MintSubmitted, Self::MintFailed)
                | (Self::MintFailed, Self::MintSubmitted)
        )
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Draft => "draft",
            Self::MetadataReady => "metadata_ready",
            Self::MintSubmitted => "mint_submitted",
            Self::Minted => "minted",
            Self::MintFailed => "mint_failed",
        })
    }
}

/// The off-chain representation of a digital artwork awaiting or having
/// completed on-chain minting.
///
/// The numeric id is owned by the record store and immutable. Confirmation
/// fields (`token_id`, `minted_by`, `tx_hash`, `minted_contract`) are written
/// exactly once, when the mint transaction confirms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: u64,
    pub name: String,
    pub description: String,

    /// Content identifier of the primary artwork image.
    pub image_cid: ContentId,
    /// Content identifier of the authenticity certificate.
    pub certificate_cid: ContentId,
    /// Content identifier of the assembled token metadata document.
    pub metadata_cid: ContentId,

    /// The collection this asset belongs to.
    pub collection_id: u64,
    /// The ledger contract the collection is deployed to.
    pub contract_address: Address,

    pub status: AssetStatus,
    pub token_id: Option<u64>,
    pub minted_by: Option<Address>,
    pub tx_hash: Option<TxHash>,
    pub minted_contract: Option<Address>,
    pub failure_reason: Option<String>,
    /// Unix seconds at which the pending mint transaction was persisted.
    pub submitted_at: Option<u64>,

    pub royalty_status: RoyaltyStatus,
    pub royalty_tx_hash: Option<TxHash>,
    pub royalty_recipients: Vec<Address>,
    pub royalty_units: Vec<u32>,
    pub royalty_failure_reason: Option<String>,
    /// Unix seconds at which the pending royalty transaction was persisted.
    pub royalty_submitted_at: Option<u64>,
}

impl AssetRecord {
    /// Creates a record in the [`Draft`](AssetStatus::Draft) state with no
    /// on-chain fields populated.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        description: impl Into<String>,
        image_cid: ContentId,
        certificate_cid: ContentId,
        metadata_cid: ContentId,
        collection_id: u64,
        contract_address: Address,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            image_cid,
            certificate_cid,
            metadata_cid,
            collection_id,
            contract_address,
            status: AssetStatus::Draft,
            token_id: None,
            minted_by: None,
            tx_hash: None,
            minted_contract: None,
            failure_reason: None,
            submitted_at: None,
            royalty_status: RoyaltyStatus::Unset,
            royalty_tx_hash: None,
            royalty_recipients: Vec::new(),
            royalty_units: Vec::new(),
            royalty_failure_reason: None,
            royalty_submitted_at: None,
        }
    }

    /// Checks the record-level invariants that every persisted state must
    /// satisfy, returning the first violated one.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        match self.status {
            AssetStatus::MintSubmitted if self.tx_hash.is_none() => {
                Err(InvariantViolation::SubmittedWithoutHash(self.id))
            }
            AssetStatus::Minted if self.tx_hash.is_none() => {
                Err(InvariantViolation::MintedWithoutHash(self.id))
            }
            AssetStatus::Minted if self.token_id.is_none() => {
                Err(InvariantViolation::MintedWithoutToken(self.id))
            }
            _ => match self.royalty_status {
                RoyaltyStatus::Submitted | RoyaltyStatus::Confirmed
                    if self.royalty_tx_hash.is_none() =>
                {
                    Err(InvariantViolation::RoyaltyWithoutHash(self.id))
                }
                _ => Ok(()),
            },
        }
    }
}

/// A violated [`AssetRecord`] invariant.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("asset {0} is mint_submitted without a transaction hash")]
    SubmittedWithoutHash(u64),

    #[error("asset {0} is minted without a transaction hash")]
    MintedWithoutHash(u64),

    #[error("asset {0} is minted without a token identifier")]
    MintedWithoutToken(u64),

    #[error("asset {0} has a submitted royalty configuration without a transaction hash")]
    RoyaltyWithoutHash(u64),
}
