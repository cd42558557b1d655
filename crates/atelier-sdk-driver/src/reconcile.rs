use std::time::{Duration, SystemTime, UNIX_EPOCH};

use atelier_sdk_rpc::{ContractGateway, CONFIRMATION_TIMEOUT};
use atelier_sdk_store::AssetRecordStore;
use atelier_sdk_types::{AssetRecord, AssetStatus, RoyaltyStatus};
use tracing::{info, warn};

use crate::{mint::resolve_token_id, DriverError};

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// What one reconciliation pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    pub confirmed: usize,
    pub reverted: usize,
    /// Submissions that still have no receipt, or whose receipt lookup
    /// failed. They stay checkpointed and are retried on the next pass.
    pub unresolved: usize,
}

/// Finalizes submissions whose session never observed the outcome.
///
/// A pending transaction survives the admin session that submitted it: the
/// hash is checkpointed before the confirmation wait starts, so a crash, a
/// closed tab, or a timeout leaves a record parked in a submitted state. The
/// reconciler sweeps those records and applies the same terminal writes the
/// orchestrators would have. Every write it performs is one the guarded
/// store transitions accept, so a concurrent session finishing first is
/// harmless.
#[derive(Debug)]
pub struct Reconciler<G, W> {
    gateway: G,
    store: W,
    timeout: Duration,
}

impl<G, W> Reconciler<G, W>
where
    G: ContractGateway,
    W: AssetRecordStore,
{
    pub fn new(gateway: G, store: W) -> Self {
        Self {
            gateway,
            store,
            timeout: CONFIRMATION_TIMEOUT,
        }
    }

    /// Sets how old a submission must be before the sweep picks it up.
    /// Younger submissions still have a live session awaiting them.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs one sweep over every stale submission.
    ///
    /// Per-record failures are logged and counted as unresolved; only a
    /// failure to query the store itself aborts the pass.
    pub async fn reconcile_once(&self) -> Result<ReconcileReport, DriverError> {
        let cutoff = unix_now().saturating_sub(self.timeout.as_secs());
        let stale = self.store.fetch_stale_submissions(cutoff).await?;

        let mut report = ReconcileReport::default();
        for record in stale {
            if record.status == AssetStatus::MintSubmitted {
                self.resolve_mint(&record, &mut report).await;
            }
            if record.royalty_status == RoyaltyStatus::Submitted {
                self.resolve_royalty(&record, &mut report).await;
            }
        }
        Ok(report)
    }

    /// Sweeps forever at `period`, logging each pass. Intended to be spawned
    /// once per process.
    pub async fn run(&self, period: Duration) {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            match self.reconcile_once().await {
                Ok(report) => info!(
                    confirmed = report.confirmed,
                    reverted = report.reverted,
                    unresolved = report.unresolved,
                    "reconciliation pass complete"
                ),
                Err(error) => warn!(%error, "reconciliation pass failed"),
            }
        }
    }

    async fn resolve_mint(&self, record: &AssetRecord, report: &mut ReconcileReport) {
        let Some(tx_hash) = record.tx_hash else {
            warn!(asset = record.id, "submitted record has no transaction hash");
            report.unresolved += 1;
            return;
        };
        let receipt = match self.gateway.get_receipt(tx_hash).await {
            Ok(Some(receipt)) => receipt,
            Ok(None) => {
                report.unresolved += 1;
                return;
            }
            Err(error) => {
                warn!(asset = record.id, %tx_hash, %error, "receipt lookup failed");
                report.unresolved += 1;
                return;
            }
        };

        if receipt.succeeded() {
            let token_id =
                match resolve_token_id(&self.gateway, &receipt, record.contract_address).await {
                    Ok(token_id) => token_id,
                    Err(error) => {
                        warn!(asset = record.id, %tx_hash, %error, "token lookup failed");
                        report.unresolved += 1;
                        return;
                    }
                };
            match self
                .store
                .update_mint_confirmed(record.id, token_id, receipt.sender, record.contract_address)
                .await
            {
                Ok(()) => {
                    info!(asset = record.id, token_id, %tx_hash, "reconciled mint as confirmed");
                    report.confirmed += 1;
                }
                Err(error) => {
                    warn!(asset = record.id, %error, "reconciliation write refused");
                    report.unresolved += 1;
                }
            }
        } else {
            let reason = receipt
                .revert_reason
                .as_deref()
                .unwrap_or("transaction reverted");
            match self.store.update_mint_failed(record.id, reason).await {
                Ok(()) => {
                    info!(asset = record.id, %tx_hash, "reconciled mint as reverted");
                    report.reverted += 1;
                }
                Err(error) => {
                    warn!(asset = record.id, %error, "reconciliation write refused");
                    report.unresolved += 1;
                }
            }
        }
    }

    async fn resolve_royalty(&self, record: &AssetRecord, report: &mut ReconcileReport) {
        let Some(tx_hash) = record.royalty_tx_hash else {
            warn!(asset = record.id, "submitted royalty has no transaction hash");
            report.unresolved += 1;
            return;
        };
        let receipt = match self.gateway.get_receipt(tx_hash).await {
            Ok(Some(receipt)) => receipt,
            Ok(None) => {
                report.unresolved += 1;
                return;
            }
            Err(error) => {
                warn!(asset = record.id, %tx_hash, %error, "receipt lookup failed");
                report.unresolved += 1;
                return;
            }
        };

        // The pending split was checkpointed with the hash, so the terminal
        // write needs nothing beyond the record itself.
        let result = if receipt.succeeded() {
            self.store
                .update_royalty_confirmed(record.id, &record.royalty_recipients, &record.royalty_units)
                .await
        } else {
            let reason = receipt
                .revert_reason
                .as_deref()
                .unwrap_or("transaction reverted");
            self.store.update_royalty_failed(record.id, reason).await
        };
        match result {
            Ok(()) if receipt.succeeded() => {
                info!(asset = record.id, %tx_hash, "reconciled royalties as confirmed");
                report.confirmed += 1;
            }
            Ok(()) => {
                info!(asset = record.id, %tx_hash, "reconciled royalties as reverted");
                report.reverted += 1;
            }
            Err(error) => {
                warn!(asset = record.id, %error, "reconciliation write refused");
                report.unresolved += 1;
            }
        }
    }
}
