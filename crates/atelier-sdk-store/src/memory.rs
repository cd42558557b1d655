use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use atelier_sdk_types::{Address, AssetRecord, AssetStatus, RoyaltyStatus, TxHash};
use tokio::sync::Mutex;

use crate::{AssetRecordStore, StoreError};

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// An in-memory [`AssetRecordStore`].
///
/// The production store is a relational database owned by a collaborator;
/// this implementation backs tests and local tooling while enforcing the same
/// transition rules the real store does.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    records: Mutex<HashMap<u64, AssetRecord>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a record, replacing any existing one with the same id.
    pub async fn insert_asset(&self, record: AssetRecord) {
        self.records.lock().await.insert(record.id, record);
    }

    async fn update<F>(&self, id: u64, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut AssetRecord) -> Result<(), StoreError>,
    {
        let mut records = self.records.lock().await;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        apply(record)
    }
}

fn check_transition(record: &AssetRecord, to: AssetStatus) -> Result<(), StoreError> {
    if record.status.can_transition_to(to) {
        Ok(())
    } else {
        Err(StoreError::IllegalTransition {
            id: record.id,
            from: record.status,
            to,
        })
    }
}

impl AssetRecordStore for MemoryAssetStore {
    async fn fetch_asset(&self, id: u64) -> Result<Option<AssetRecord>, StoreError> {
        Ok(self.records.lock().await.get(&id).cloned())
    }

    async fn update_mint_submission(&self, id: u64, tx_hash: TxHash) -> Result<(), StoreError> {
        self.update(id, |record| {
            check_transition(record, AssetStatus::MintSubmitted)?;
            record.status = AssetStatus::MintSubmitted;
            record.tx_hash = Some(tx_hash);
            record.submitted_at = Some(unix_now());
            record.failure_reason = None;
            Ok(())
        })
        .await
    }

    async fn update_mint_confirmed(
        &self,
        id: u64,
        token_id: u64,
        minter: Address,
        contract: Address,
    ) -> Result<(), StoreError> {
        self.update(id, |record| {
            check_transition(record, AssetStatus::Minted)?;
            record.status = AssetStatus::Minted;
            record.token_id = Some(token_id);
            record.minted_by = Some(minter);
            record.minted_contract = Some(contract);
            Ok(())
        })
        .await
    }

    async fn update_mint_failed(&self, id: u64, reason: &str) -> Result<(), StoreError> {
        self.update(id, |record| {
            check_transition(record, AssetStatus::MintFailed)?;
            record.status = AssetStatus::MintFailed;
            record.failure_reason = Some(reason.to_string());
            Ok(())
        })
        .await
    }

    async fn update_royalty_submission(
        &self,
        id: u64,
        tx_hash: TxHash,
        recipients: &[Address],
        units: &[u32],
    ) -> Result<(), StoreError> {
        self.update(id, |record| {
            if !record.royalty_status.allows_resubmission() {
                return Err(StoreError::IllegalRoyaltyTransition {
                    id,
                    from: record.royalty_status,
                    to: RoyaltyStatus::Submitted,
                });
            }
            record.royalty_status = RoyaltyStatus::Submitted;
            record.royalty_tx_hash = Some(tx_hash);
            record.royalty_recipients = recipients.to_vec();
            record.royalty_units = units.to_vec();
            record.royalty_submitted_at = Some(unix_now());
            record.royalty_failure_reason = None;
            Ok(())
        })
        .await
    }

    async fn update_royalty_confirmed(
        &self,
        id: u64,
        recipients: &[Address],
        units: &[u32],
    ) -> Result<(), StoreError> {
        self.update(id, |record| {
            if record.royalty_status != RoyaltyStatus::Submitted {
                return Err(StoreError::IllegalRoyaltyTransition {
                    id,
                    from: record.royalty_status,
                    to: RoyaltyStatus::Confirmed,
                });
            }
            record.royalty_status = RoyaltyStatus::Confirmed;
            record.royalty_recipients = recipients.to_vec();
            record.royalty_units = units.to_vec();
            Ok(())
        })
        .await
    }

    async fn update_royalty_failed(&self, id: u64, reason: &str) -> Result<(), StoreError> {
        self.update(id, |record| {
            if record.royalty_status != RoyaltyStatus::Submitted {
                return Err(StoreError::IllegalRoyaltyTransition {
                    id,
                    from: record.royalty_status,
                    to: RoyaltyStatus::ConfigFailed,
                });
            }
            record.royalty_status = RoyaltyStatus::ConfigFailed;
            record.royalty_failure_reason = Some(reason.to_string());
            Ok(())
        })
        .await
    }

    async fn fetch_stale_submissions(
        &self,
        cutoff_unix: u64,
    ) -> Result<Vec<AssetRecord>, StoreError> {
        let records = self.records.lock().await;
        let mut stale: Vec<AssetRecord> = records
            .values()
            .filter(|record| {
                let mint_stale = record.status == AssetStatus::MintSubmitted
                    && record.submitted_at.is_some_and(|at| at <= cutoff_unix);
                let royalty_stale = record.royalty_status == RoyaltyStatus::Submitted
                    && record.royalty_submitted_at.is_some_and(|at| at <= cutoff_unix);
                mint_stale || royalty_stale
            })
            .cloned()
            .collect();
        stale.sort_by_key(|record| record.id);
        Ok(stale)
    }
}

#[cfg(test)]
mod tests {
    use atelier_sdk_types::ContentId;
    use hex_literal::hex;

    use super::*;

    fn asset(id: u64, status: AssetStatus) -> AssetRecord {
        let mut record = AssetRecord::new(
            id,
            "Sunset",
            "Oil on canvas",
            ContentId::new("bafy-image").unwrap(),
            ContentId::new("bafy-cert").unwrap(),
            ContentId::new("bafy-meta").unwrap(),
            7,
            Address::new([0x27; 20]),
        );
        record.status = status;
        record
    }

    fn hash() -> TxHash {
        TxHash::new(hex!(
            "ccd5bb71183532bff220ba46c268991a3ff07eb358e8255a65c30a2dce0e5fbb"
        ))
    }

    #[tokio::test]
    async fn test_mint_lifecycle_writes() -> anyhow::Result<()> {
        let store = MemoryAssetStore::new();
        store.insert_asset(asset(1, AssetStatus::MetadataReady)).await;

        store.update_mint_submission(1, hash()).await?;
        let record = store.fetch_asset(1).await?.unwrap();
        assert_eq!(record.status, AssetStatus::MintSubmitted);
        assert_eq!(record.tx_hash, Some(hash()));
        assert!(record.submitted_at.is_some());

        let minter = Address::new([0x52; 20]);
        let contract = Address::new([0x27; 20]);
        store.update_mint_confirmed(1, 42, minter, contract).await?;
        let record = store.fetch_asset(1).await?.unwrap();
        assert_eq!(record.status, AssetStatus::Minted);
        assert_eq!(record.token_id, Some(42));
        assert_eq!(record.minted_by, Some(minter));
        assert_eq!(record.minted_contract, Some(contract));
        assert_eq!(record.check_invariants(), Ok(()));
        Ok(())
    }

    #[tokio::test]
    async fn test_illegal_transitions_are_refused() -> anyhow::Result<()> {
        let store = MemoryAssetStore::new();
        store.insert_asset(asset(1, AssetStatus::Draft)).await;

        // A draft cannot be submitted.
        assert!(matches!(
            store.update_mint_submission(1, hash()).await,
            Err(StoreError::IllegalTransition { .. })
        ));

        // A record that was never submitted cannot be confirmed.
        let minter = Address::default();
        assert!(matches!(
            store.update_mint_confirmed(1, 42, minter, minter).await,
            Err(StoreError::IllegalTransition { .. })
        ));

        // Minted is terminal: confirming twice fails.
        store.insert_asset(asset(2, AssetStatus::MetadataReady)).await;
        store.update_mint_submission(2, hash()).await?;
        store.update_mint_confirmed(2, 42, minter, minter).await?;
        assert!(matches!(
            store.update_mint_confirmed(2, 43, minter, minter).await,
            Err(StoreError::IllegalTransition { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_retry_after_failure() -> anyhow::Result<()> {
        let store = MemoryAssetStore::new();
        store.insert_asset(asset(1, AssetStatus::MetadataReady)).await;

        store.update_mint_submission(1, hash()).await?;
        store.update_mint_failed(1, "transaction reverted").await?;
        let record = store.fetch_asset(1).await?.unwrap();
        assert_eq!(record.status, AssetStatus::MintFailed);
        assert_eq!(record.failure_reason.as_deref(), Some("transaction reverted"));

        // Manual retry moves the record forward again and clears the reason.
        store.update_mint_submission(1, hash()).await?;
        let record = store.fetch_asset(1).await?.unwrap();
        assert_eq!(record.status, AssetStatus::MintSubmitted);
        assert_eq!(record.failure_reason, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_royalty_resubmission_until_confirmed() -> anyhow::Result<()> {
        let store = MemoryAssetStore::new();
        let mut record = asset(1, AssetStatus::Minted);
        record.token_id = Some(42);
        record.tx_hash = Some(hash());
        store.insert_asset(record).await;

        let recipients = [Address::new([0x01; 20]), Address::new([0x02; 20])];
        store
            .update_royalty_submission(1, hash(), &recipients, &[60, 40])
            .await?;
        // Overwriting an unconfirmed submission is allowed.
        store
            .update_royalty_submission(1, hash(), &recipients, &[50, 50])
            .await?;
        store
            .update_royalty_confirmed(1, &recipients, &[50, 50])
            .await?;

        let record = store.fetch_asset(1).await?.unwrap();
        assert_eq!(record.royalty_status, RoyaltyStatus::Confirmed);
        assert_eq!(record.royalty_units, vec![50, 50]);

        // Confirmed is final.
        assert!(matches!(
            store
                .update_royalty_submission(1, hash(), &recipients, &[60, 40])
                .await,
            Err(StoreError::IllegalRoyaltyTransition { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_stale_submission_query() -> anyhow::Result<()> {
        let store = MemoryAssetStore::new();
        store.insert_asset(asset(1, AssetStatus::MetadataReady)).await;
        store.insert_asset(asset(2, AssetStatus::MetadataReady)).await;

        store.update_mint_submission(1, hash()).await?;

        let now = unix_now();
        let stale = store.fetch_stale_submissions(now).await?;
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].id, 1);

        // A cutoff in the past excludes the fresh submission.
        let stale = store.fetch_stale_submissions(now - 60).await?;
        assert!(stale.is_empty());
        Ok(())
    }

    /// Drives a record through random sequences of store writes and checks
    /// that accepted writes never violate the record invariants.
    #[tokio::test]
    async fn test_invariants_hold_over_random_transitions() -> anyhow::Result<()> {
        let mut rng = fastrand::Rng::with_seed(0x5eed);

        for _ in 0..200 {
            let store = MemoryAssetStore::new();
            store.insert_asset(asset(1, AssetStatus::MetadataReady)).await;

            for _ in 0..12 {
                let minter = Address::new([0x52; 20]);
                let recipients = [Address::new([0x01; 20])];
                // Outcomes are intentionally ignored: illegal writes must be
                // refused, and refused writes must leave the record valid.
                let _ = match rng.u8(0..6) {
                    0 => store.update_mint_submission(1, hash()).await,
                    1 => store.update_mint_confirmed(1, 42, minter, minter).await,
                    2 => store.update_mint_failed(1, "transaction reverted").await,
                    3 => {
                        store
                            .update_royalty_submission(1, hash(), &recipients, &[100])
                            .await
                    }
                    4 => store.update_royalty_confirmed(1, &recipients, &[100]).await,
                    _ => store.update_royalty_failed(1, "transaction reverted").await,
                };

                let record = store.fetch_asset(1).await?.unwrap();
                assert_eq!(record.check_invariants(), Ok(()), "record: {record:?}");
            }
        }
        Ok(())
    }
}
