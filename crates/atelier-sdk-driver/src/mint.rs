use std::time::Duration;

use atelier_sdk_rpc::{
    ContractCall, ContractGateway, GatewayError, SignerError, TransactionReceipt,
    TransactionSigner, CONFIRMATION_TIMEOUT,
};
use atelier_sdk_store::AssetRecordStore;
use atelier_sdk_types::{Address, AssetRecord, Capability, TxHash};
use tracing::{debug, error, info, warn};

use crate::{CapabilityChecker, DriverError, InFlightLocks};

/// The result of a mint invocation that made it past submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintOutcome {
    /// The transaction confirmed and the record is finalized.
    Minted { token_id: u64, tx_hash: TxHash },
    /// The confirmation window elapsed with the outcome still unknown. The
    /// transaction may confirm later; the record stays in `MintSubmitted`
    /// until a later check or the reconciliation sweep resolves it. Never
    /// present this as either success or failure.
    Pending { tx_hash: TxHash },
}

/// Builds the on-chain mint payload for an asset record. Structural flags
/// are defaulted to empty/zero for this asset class.
pub(crate) fn mint_call(record: &AssetRecord) -> ContractCall {
    ContractCall::new(
        record.contract_address,
        "mint",
        serde_json::json!([record.metadata_cid, record.certificate_cid, [], 0]),
    )
}

/// Resolves the minted token identifier from a receipt, falling back to a
/// contract read when the receipt does not carry it. A failure here does not
/// mean the transaction failed; the mint is confirmed and only the token
/// identifier is still unknown.
pub(crate) async fn resolve_token_id<G: ContractGateway>(
    gateway: &G,
    receipt: &TransactionReceipt,
    contract: Address,
) -> Result<u64, GatewayError> {
    if let Some(token_id) = receipt.token_id {
        return Ok(token_id);
    }
    let call = ContractCall::new(
        contract,
        "token_by_transaction",
        serde_json::json!([receipt.tx_hash]),
    );
    let value = gateway.read(&call).await?;
    value.as_u64().ok_or_else(|| {
        GatewayError::MalformedResponse("token identifier missing from lookup".to_string())
    })
}

/// Drives an asset record from `MetadataReady` (or a failed attempt) to
/// `Minted`.
///
/// The pipeline is capability check, simulate, submit, checkpoint, await.
/// The submitted hash is persisted before the confirmation wait starts; that
/// write is the recovery checkpoint a crashed or cancelled session is
/// reconciled from.
#[derive(Debug)]
pub struct MintOrchestrator<G, W, S> {
    gateway: G,
    store: W,
    signer: S,
    locks: InFlightLocks,
    confirmation_timeout: Duration,
}

impl<G, W, S> MintOrchestrator<G, W, S>
where
    G: ContractGateway,
    W: AssetRecordStore,
    S: TransactionSigner,
{
    pub fn new(gateway: G, store: W, signer: S) -> Self {
        Self {
            gateway,
            store,
            signer,
            locks: InFlightLocks::new(),
            confirmation_timeout: CONFIRMATION_TIMEOUT,
        }
    }

    /// Shares an in-flight registry with other orchestrators so that mint
    /// and royalty attempts for the same record exclude each other.
    pub fn with_locks(mut self, locks: InFlightLocks) -> Self {
        self.locks = locks;
        self
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    pub async fn mint(
        &self,
        record: &AssetRecord,
        caller: Address,
    ) -> Result<MintOutcome, DriverError> {
        if !record.status.is_mintable() {
            return Err(DriverError::NotMintable {
                id: record.id,
                status: record.status,
            });
        }

        let _guard = self
            .locks
            .acquire(record.id)
            .ok_or(DriverError::OperationInFlight(record.id))?;

        let contract = record.contract_address;
        let authorized = CapabilityChecker::new(&self.gateway)
            .has_capability(contract, Capability::Minter, caller)
            .await;
        if !authorized {
            return Err(DriverError::Unauthorized {
                caller,
                capability: Capability::Minter,
                contract,
            });
        }

        let call = mint_call(record);
        let plan = self
            .gateway
            .simulate(&call, caller)
            .await
            .map_err(|error| DriverError::SimulationFailed(error.to_string()))?;

        let tx_hash = match self.gateway.submit(&plan, &self.signer).await {
            Ok(tx_hash) => tx_hash,
            Err(GatewayError::Signer(SignerError::Rejected)) => {
                // A dismissed wallet prompt is a choice, not a fault.
                debug!(asset = record.id, "mint signing declined by the user");
                return Err(DriverError::UserRejected);
            }
            Err(error) => return Err(DriverError::SubmissionFailed(error.to_string())),
        };

        if let Err(store_error) = self.store.update_mint_submission(record.id, tx_hash).await {
            // The transaction is live on chain but the checkpoint write
            // failed; keep the hash recoverable from the log.
            error!(
                asset = record.id,
                %tx_hash,
                %store_error,
                "submitted mint transaction could not be checkpointed"
            );
            return Err(store_error.into());
        }
        info!(asset = record.id, %tx_hash, "mint transaction submitted");

        match self
            .gateway
            .await_receipt(tx_hash, self.confirmation_timeout)
            .await
        {
            Ok(Some(receipt)) if receipt.succeeded() => {
                let token_id =
                    match resolve_token_id(&self.gateway, &receipt, contract).await {
                        Ok(token_id) => token_id,
                        Err(error) => {
                            // The transaction succeeded; only the token
                            // identifier is unknown. Not a failure.
                            warn!(
                                asset = record.id,
                                %tx_hash,
                                %error,
                                "mint confirmed but the token lookup failed"
                            );
                            return Ok(MintOutcome::Pending { tx_hash });
                        }
                    };
                self.store
                    .update_mint_confirmed(record.id, token_id, caller, contract)
                    .await?;
                info!(asset = record.id, token_id, %tx_hash, "mint confirmed");
                Ok(MintOutcome::Minted { token_id, tx_hash })
            }
            Ok(Some(receipt)) => {
                let reason = receipt
                    .revert_reason
                    .unwrap_or_else(|| "transaction reverted".to_string());
                self.store.update_mint_failed(record.id, &reason).await?;
                Err(DriverError::ConfirmationFailed(reason))
            }
            Ok(None) => {
                info!(
                    asset = record.id,
                    %tx_hash,
                    "mint confirmation timed out; transaction may still confirm"
                );
                Ok(MintOutcome::Pending { tx_hash })
            }
            Err(error) => {
                // The outcome is unknown, not failed; the reconciliation
                // sweep resolves it from the checkpointed hash.
                warn!(asset = record.id, %tx_hash, %error, "receipt lookup failed");
                Ok(MintOutcome::Pending { tx_hash })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use atelier_sdk_store::MemoryAssetStore;
    use atelier_sdk_test::{
        metadata_ready_asset, reverted_receipt, success_receipt, test_address, test_tx_hash,
        ApprovingSigner, RejectingSigner, ScriptedLedger,
    };
    use atelier_sdk_types::AssetStatus;

    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(20);

    fn contract() -> Address {
        test_address(0x27)
    }

    fn caller() -> Address {
        test_address(0x52)
    }

    async fn seeded_store(record: &AssetRecord) -> MemoryAssetStore {
        let store = MemoryAssetStore::new();
        store.insert_asset(record.clone()).await;
        store
    }

    #[tokio::test]
    async fn test_mint_happy_path() -> anyhow::Result<()> {
        let ledger = ScriptedLedger::new();
        ledger.grant(contract(), Capability::Minter, caller());
        let tx_hash = test_tx_hash(0xab);
        ledger.expect_tx_hash(tx_hash);
        ledger.push_receipt(success_receipt(tx_hash, caller(), Some(42)));

        let record = metadata_ready_asset(1, contract());
        let store = seeded_store(&record).await;
        let orchestrator = MintOrchestrator::new(ledger.clone(), &store, ApprovingSigner)
            .with_confirmation_timeout(TIMEOUT);

        let outcome = orchestrator.mint(&record, caller()).await?;
        assert_eq!(
            outcome,
            MintOutcome::Minted {
                token_id: 42,
                tx_hash
            }
        );

        let stored = store.fetch_asset(1).await?.unwrap();
        assert_eq!(stored.status, AssetStatus::Minted);
        assert_eq!(stored.token_id, Some(42));
        assert_eq!(stored.tx_hash, Some(tx_hash));
        assert_eq!(stored.minted_by, Some(caller()));
        assert_eq!(stored.minted_contract, Some(contract()));
        assert_eq!(stored.check_invariants(), Ok(()));

        // Exactly one ledger-mutating call.
        assert_eq!(ledger.submit_calls(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_unauthorized_caller_is_rejected_before_any_ledger_call() -> anyhow::Result<()> {
        let ledger = ScriptedLedger::new();
        let record = metadata_ready_asset(1, contract());
        let store = seeded_store(&record).await;
        let orchestrator = MintOrchestrator::new(ledger.clone(), &store, ApprovingSigner)
            .with_confirmation_timeout(TIMEOUT);

        let result = orchestrator.mint(&record, caller()).await;
        assert!(matches!(result, Err(DriverError::Unauthorized { .. })));

        assert_eq!(ledger.simulate_calls(), 0);
        assert_eq!(ledger.submit_calls(), 0);
        assert_eq!(store.fetch_asset(1).await?.unwrap(), record);
        Ok(())
    }

    #[tokio::test]
    async fn test_simulation_failure_mutates_nothing() -> anyhow::Result<()> {
        let ledger = ScriptedLedger::new();
        ledger.grant(contract(), Capability::Minter, caller());
        ledger.fail_next_simulation("execution reverted: supply cap reached");

        let record = metadata_ready_asset(1, contract());
        let store = seeded_store(&record).await;
        let orchestrator = MintOrchestrator::new(ledger.clone(), &store, ApprovingSigner)
            .with_confirmation_timeout(TIMEOUT);

        let result = orchestrator.mint(&record, caller()).await;
        assert!(matches!(result, Err(DriverError::SimulationFailed(_))));

        assert_eq!(ledger.submit_calls(), 0);
        assert_eq!(store.fetch_asset(1).await?.unwrap(), record);
        Ok(())
    }

    #[tokio::test]
    async fn test_user_rejection_is_distinct_and_clean() -> anyhow::Result<()> {
        let ledger = ScriptedLedger::new();
        ledger.grant(contract(), Capability::Minter, caller());

        let record = metadata_ready_asset(1, contract());
        let store = seeded_store(&record).await;
        let orchestrator = MintOrchestrator::new(ledger.clone(), &store, RejectingSigner)
            .with_confirmation_timeout(TIMEOUT);

        let result = orchestrator.mint(&record, caller()).await;
        assert!(matches!(result, Err(DriverError::UserRejected)));
        assert_eq!(store.fetch_asset(1).await?.unwrap(), record);
        Ok(())
    }

    #[tokio::test]
    async fn test_submission_failure_leaves_no_checkpoint() -> anyhow::Result<()> {
        let ledger = ScriptedLedger::new();
        ledger.grant(contract(), Capability::Minter, caller());
        ledger.fail_next_submission("node unavailable");

        let record = metadata_ready_asset(1, contract());
        let store = seeded_store(&record).await;
        let orchestrator = MintOrchestrator::new(ledger.clone(), &store, ApprovingSigner)
            .with_confirmation_timeout(TIMEOUT);

        let result = orchestrator.mint(&record, caller()).await;
        assert!(matches!(result, Err(DriverError::SubmissionFailed(_))));

        let stored = store.fetch_asset(1).await?.unwrap();
        assert_eq!(stored.status, AssetStatus::MetadataReady);
        assert_eq!(stored.tx_hash, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_confirmation_timeout_is_pending_not_failed() -> anyhow::Result<()> {
        let ledger = ScriptedLedger::new();
        ledger.grant(contract(), Capability::Minter, caller());
        let tx_hash = test_tx_hash(0xab);
        ledger.expect_tx_hash(tx_hash);
        // No receipt is ever scripted, so the await times out.

        let record = metadata_ready_asset(1, contract());
        let store = seeded_store(&record).await;
        let orchestrator = MintOrchestrator::new(ledger.clone(), &store, ApprovingSigner)
            .with_confirmation_timeout(TIMEOUT);

        let outcome = orchestrator.mint(&record, caller()).await?;
        assert_eq!(outcome, MintOutcome::Pending { tx_hash });

        let stored = store.fetch_asset(1).await?.unwrap();
        assert_eq!(stored.status, AssetStatus::MintSubmitted);
        assert_eq!(stored.tx_hash, Some(tx_hash));
        assert_eq!(stored.check_invariants(), Ok(()));
        Ok(())
    }

    #[tokio::test]
    async fn test_reverted_transaction_marks_failed() -> anyhow::Result<()> {
        let ledger = ScriptedLedger::new();
        ledger.grant(contract(), Capability::Minter, caller());
        let tx_hash = test_tx_hash(0xab);
        ledger.expect_tx_hash(tx_hash);
        ledger.push_receipt(reverted_receipt(tx_hash, caller(), "transaction reverted"));

        let record = metadata_ready_asset(1, contract());
        let store = seeded_store(&record).await;
        let orchestrator = MintOrchestrator::new(ledger.clone(), &store, ApprovingSigner)
            .with_confirmation_timeout(TIMEOUT);

        let result = orchestrator.mint(&record, caller()).await;
        assert!(matches!(result, Err(DriverError::ConfirmationFailed(_))));

        let stored = store.fetch_asset(1).await?.unwrap();
        assert_eq!(stored.status, AssetStatus::MintFailed);
        assert_eq!(
            stored.failure_reason.as_deref(),
            Some("transaction reverted")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_retry_after_failure_succeeds() -> anyhow::Result<()> {
        let ledger = ScriptedLedger::new();
        ledger.grant(contract(), Capability::Minter, caller());
        let failed = test_tx_hash(0x01);
        let retried = test_tx_hash(0x02);
        ledger.expect_tx_hash(failed);
        ledger.expect_tx_hash(retried);
        ledger.push_receipt(reverted_receipt(failed, caller(), "transaction reverted"));
        ledger.push_receipt(success_receipt(retried, caller(), Some(7)));

        let record = metadata_ready_asset(1, contract());
        let store = seeded_store(&record).await;
        let orchestrator = MintOrchestrator::new(ledger.clone(), &store, ApprovingSigner)
            .with_confirmation_timeout(TIMEOUT);

        let first = orchestrator.mint(&record, caller()).await;
        assert!(matches!(first, Err(DriverError::ConfirmationFailed(_))));

        let failed_record = store.fetch_asset(1).await?.unwrap();
        assert!(failed_record.status.is_mintable());

        let outcome = orchestrator.mint(&failed_record, caller()).await?;
        assert_eq!(
            outcome,
            MintOutcome::Minted {
                token_id: 7,
                tx_hash: retried
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_draft_record_is_not_mintable() {
        let ledger = ScriptedLedger::new();
        let mut record = metadata_ready_asset(1, contract());
        record.status = AssetStatus::Draft;
        let store = seeded_store(&record).await;
        let orchestrator = MintOrchestrator::new(ledger, &store, ApprovingSigner);

        let result = orchestrator.mint(&record, caller()).await;
        assert!(matches!(result, Err(DriverError::NotMintable { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_attempt_is_refused() {
        let ledger = ScriptedLedger::new();
        ledger.grant(contract(), Capability::Minter, caller());

        let record = metadata_ready_asset(1, contract());
        let store = seeded_store(&record).await;
        let locks = InFlightLocks::new();
        let orchestrator = MintOrchestrator::new(ledger, &store, ApprovingSigner)
            .with_locks(locks.clone())
            .with_confirmation_timeout(TIMEOUT);

        let _held = locks.acquire(1).unwrap();
        let result = orchestrator.mint(&record, caller()).await;
        assert!(matches!(result, Err(DriverError::OperationInFlight(1))));
    }

    #[tokio::test]
    async fn test_token_id_falls_back_to_contract_read() -> anyhow::Result<()> {
        let ledger = ScriptedLedger::new();
        ledger.grant(contract(), Capability::Minter, caller());
        let tx_hash = test_tx_hash(0xab);
        ledger.expect_tx_hash(tx_hash);
        ledger.push_receipt(success_receipt(tx_hash, caller(), None));
        ledger.set_read("token_by_transaction", serde_json::json!(42));

        let record = metadata_ready_asset(1, contract());
        let store = seeded_store(&record).await;
        let orchestrator = MintOrchestrator::new(ledger.clone(), &store, ApprovingSigner)
            .with_confirmation_timeout(TIMEOUT);

        let outcome = orchestrator.mint(&record, caller()).await?;
        assert_eq!(
            outcome,
            MintOutcome::Minted {
                token_id: 42,
                tx_hash
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_token_lookup_after_success_is_pending() -> anyhow::Result<()> {
        let ledger = ScriptedLedger::new();
        ledger.grant(contract(), Capability::Minter, caller());
        let tx_hash = test_tx_hash(0xab);
        ledger.expect_tx_hash(tx_hash);
        // The receipt confirms without a token identifier and the fallback
        // read is not answered. The mint succeeded on chain, so the caller
        // must see pending, never a failure.
        ledger.push_receipt(success_receipt(tx_hash, caller(), None));

        let record = metadata_ready_asset(1, contract());
        let store = seeded_store(&record).await;
        let orchestrator = MintOrchestrator::new(ledger.clone(), &store, ApprovingSigner)
            .with_confirmation_timeout(TIMEOUT);

        let outcome = orchestrator.mint(&record, caller()).await?;
        assert_eq!(outcome, MintOutcome::Pending { tx_hash });

        let stored = store.fetch_asset(1).await?.unwrap();
        assert_eq!(stored.status, AssetStatus::MintSubmitted);
        assert_eq!(stored.tx_hash, Some(tx_hash));
        Ok(())
    }

    #[tokio::test]
    async fn test_receipt_lookup_error_is_pending() -> anyhow::Result<()> {
        let ledger = ScriptedLedger::new();
        ledger.grant(contract(), Capability::Minter, caller());
        let tx_hash = test_tx_hash(0xab);
        ledger.expect_tx_hash(tx_hash);
        ledger.fail_next_receipt_lookup("node unavailable");

        let record = metadata_ready_asset(1, contract());
        let store = seeded_store(&record).await;
        let orchestrator = MintOrchestrator::new(ledger.clone(), &store, ApprovingSigner)
            .with_confirmation_timeout(TIMEOUT);

        let outcome = orchestrator.mint(&record, caller()).await?;
        assert_eq!(outcome, MintOutcome::Pending { tx_hash });

        let stored = store.fetch_asset(1).await?.unwrap();
        assert_eq!(stored.status, AssetStatus::MintSubmitted);
        Ok(())
    }
}
