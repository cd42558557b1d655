use std::future::Future;

use atelier_sdk_types::{Address, AssetRecord, AssetStatus, RoyaltyStatus, TxHash};
use thiserror::Error;

/// Errors surfaced by an asset record store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("asset record {0} not found")]
    NotFound(u64),

    #[error("illegal status transition from {from} to {to} for asset {id}")]
    IllegalTransition {
        id: u64,
        from: AssetStatus,
        to: AssetStatus,
    },

    #[error("illegal royalty transition from {from} to {to} for asset {id}")]
    IllegalRoyaltyTransition {
        id: u64,
        from: RoyaltyStatus,
        to: RoyaltyStatus,
    },

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// The persistence boundary for asset records.
///
/// Every write is an independent operation with no multi-field atomicity
/// guarantee across calls; readers must tolerate a record that is between two
/// writes. Mint-owned and royalty-owned fields are disjoint, so the two
/// orchestrators never write over each other.
pub trait AssetRecordStore {
    fn fetch_asset(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<Option<AssetRecord>, StoreError>>;

    /// The mint recovery checkpoint: persists the submitted transaction hash
    /// and moves the record to `MintSubmitted` before confirmation is known.
    fn update_mint_submission(
        &self,
        id: u64,
        tx_hash: TxHash,
    ) -> impl Future<Output = Result<(), StoreError>>;

    /// Finalizes a confirmed mint. The token identifier, minter, and contract
    /// are written exactly once here.
    fn update_mint_confirmed(
        &self,
        id: u64,
        token_id: u64,
        minter: Address,
        contract: Address,
    ) -> impl Future<Output = Result<(), StoreError>>;

    fn update_mint_failed(
        &self,
        id: u64,
        reason: &str,
    ) -> impl Future<Output = Result<(), StoreError>>;

    /// The royalty recovery checkpoint. The pending split travels with the
    /// hash so a reconciliation pass can finalize it without re-deriving the
    /// configuration.
    fn update_royalty_submission(
        &self,
        id: u64,
        tx_hash: TxHash,
        recipients: &[Address],
        units: &[u32],
    ) -> impl Future<Output = Result<(), StoreError>>;

    fn update_royalty_confirmed(
        &self,
        id: u64,
        recipients: &[Address],
        units: &[u32],
    ) -> impl Future<Output = Result<(), StoreError>>;

    fn update_royalty_failed(
        &self,
        id: u64,
        reason: &str,
    ) -> impl Future<Output = Result<(), StoreError>>;

    /// Records whose mint or royalty submission is still unresolved and was
    /// checkpointed at or before `cutoff_unix`. This feeds the reconciliation
    /// sweep.
    fn fetch_stale_submissions(
        &self,
        cutoff_unix: u64,
    ) -> impl Future<Output = Result<Vec<AssetRecord>, StoreError>>;
}

impl<T: AssetRecordStore> AssetRecordStore for &T {
    fn fetch_asset(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<Option<AssetRecord>, StoreError>> {
        (**self).fetch_asset(id)
    }

    fn update_mint_submission(
        &self,
        id: u64,
        tx_hash: TxHash,
    ) -> impl Future<Output = Result<(), StoreError>> {
        (**self).update_mint_submission(id, tx_hash)
    }

    fn update_mint_confirmed(
        &self,
        id: u64,
        token_id: u64,
        minter: Address,
        contract: Address,
    ) -> impl Future<Output = Result<(), StoreError>> {
        (**self).update_mint_confirmed(id, token_id, minter, contract)
    }

    fn update_mint_failed(
        &self,
        id: u64,
        reason: &str,
    ) -> impl Future<Output = Result<(), StoreError>> {
        (**self).update_mint_failed(id, reason)
    }

    fn update_royalty_submission(
        &self,
        id: u64,
        tx_hash: TxHash,
        recipients: &[Address],
        units: &[u32],
    ) -> impl Future<Output = Result<(), StoreError>> {
        (**self).update_royalty_submission(id, tx_hash, recipients, units)
    }

    fn update_royalty_confirmed(
        &self,
        id: u64,
        recipients: &[Address],
        units: &[u32],
    ) -> impl Future<Output = Result<(), StoreError>> {
        (**self).update_royalty_confirmed(id, recipients, units)
    }

    fn update_royalty_failed(
        &self,
        id: u64,
        reason: &str,
    ) -> impl Future<Output = Result<(), StoreError>> {
        (**self).update_royalty_failed(id, reason)
    }

    fn fetch_stale_submissions(
        &self,
        cutoff_unix: u64,
    ) -> impl Future<Output = Result<Vec<AssetRecord>, StoreError>> {
        (**self).fetch_stale_submissions(cutoff_unix)
    }
}
