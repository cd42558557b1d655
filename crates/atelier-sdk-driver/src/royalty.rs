use std::time::Duration;

use atelier_sdk_rpc::{
    ContractCall, ContractGateway, GatewayError, SignerError, TransactionSigner,
    CONFIRMATION_TIMEOUT,
};
use atelier_sdk_store::AssetRecordStore;
use atelier_sdk_types::{Address, AssetRecord, Capability, RoyaltyConfiguration, TxHash};
use tracing::{debug, error, info, warn};

use crate::{CapabilityChecker, DriverError, InFlightLocks};

/// The permitted rounding drift when checking that percentages sum to 100.
/// Form inputs arrive as floats, so 33.33 + 33.33 + 33.34 must pass.
const PERCENT_TOLERANCE: f64 = 1e-9;

/// The result of a royalty configuration attempt that made it past submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoyaltyOutcome {
    /// The configuration transaction confirmed and the record is finalized.
    Confirmed { tx_hash: TxHash },
    /// The confirmation window elapsed with the outcome still unknown. The
    /// record stays in `Submitted` until the reconciliation sweep resolves it.
    Pending { tx_hash: TxHash },
}

/// A validated royalty split in ledger units, ready to submit.
///
/// `units[i]` is the absolute share of `recipients[i]`, and `total_units` is
/// the on-chain total royalty the units are carved out of. Both are integers
/// because the contract does not accept fractional shares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoyaltySplit {
    pub recipients: Vec<Address>,
    pub units: Vec<u32>,
    pub total_units: u32,
}

/// Validates a royalty configuration and converts it to ledger units.
///
/// Two totals are checked independently: the recipient percentages must sum
/// to exactly 100 (within float tolerance), and the form-declared
/// `beneficiary_total` must itself be 100. The second check catches a form
/// whose declared total went stale after a recipient edit.
pub fn validate_configuration(
    config: &RoyaltyConfiguration,
) -> Result<RoyaltySplit, DriverError> {
    if config.recipients.is_empty() {
        return Err(DriverError::InvalidConfiguration(
            "at least one recipient is required".to_string(),
        ));
    }

    if config.total_percent.is_nan()
        || config.total_percent <= 0.0
        || config.total_percent > 100.0
    {
        return Err(DriverError::InvalidConfiguration(format!(
            "total royalty percentage must be in (0, 100], got {}",
            config.total_percent
        )));
    }

    let mut recipients = Vec::with_capacity(config.recipients.len());
    let mut units = Vec::with_capacity(config.recipients.len());
    let mut percent_sum = 0.0;
    for recipient in &config.recipients {
        let address: Address = recipient.address.parse().map_err(|error| {
            DriverError::InvalidConfiguration(format!(
                "recipient address {:?}: {error}",
                recipient.address
            ))
        })?;
        if recipient.percent.is_nan() || recipient.percent <= 0.0 {
            return Err(DriverError::InvalidConfiguration(format!(
                "recipient {address} has a non-positive share {}",
                recipient.percent
            )));
        }
        percent_sum += recipient.percent;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let unit = (recipient.percent * config.total_percent / 100.0).round() as u32;
        if unit == 0 {
            // The contract takes integer units; a share that rounds away
            // entirely would silently drop the recipient.
            return Err(DriverError::InvalidConfiguration(format!(
                "recipient {address} share {} rounds to zero ledger units at total {}",
                recipient.percent, config.total_percent
            )));
        }
        recipients.push(address);
        units.push(unit);
    }

    if (percent_sum - 100.0).abs() > PERCENT_TOLERANCE {
        return Err(DriverError::InvalidConfiguration(format!(
            "recipient shares must sum to 100, got {percent_sum}"
        )));
    }
    if config.beneficiary_total.is_nan()
        || (config.beneficiary_total - 100.0).abs() > PERCENT_TOLERANCE
    {
        return Err(DriverError::InvalidConfiguration(format!(
            "declared beneficiary total must be 100, got {}",
            config.beneficiary_total
        )));
    }

    let total_units = units.iter().sum();
    Ok(RoyaltySplit {
        recipients,
        units,
        total_units,
    })
}

/// Builds the on-chain royalty configuration payload for a validated split.
pub(crate) fn configure_call(
    contract: Address,
    token_id: u64,
    split: &RoyaltySplit,
) -> ContractCall {
    ContractCall::new(
        contract,
        "configure_royalties",
        serde_json::json!([token_id, split.recipients, split.units, split.total_units]),
    )
}

/// Attaches a royalty configuration to a minted asset.
///
/// Follows the same pipeline as minting: capability check, simulate, submit,
/// checkpoint, await. A configuration may be resubmitted any number of times
/// until one confirms; after that the split is immutable.
#[derive(Debug)]
pub struct RoyaltyOrchestrator<G, W, S> {
    gateway: G,
    store: W,
    signer: S,
    locks: InFlightLocks,
    confirmation_timeout: Duration,
}

impl<G, W, S> RoyaltyOrchestrator<G, W, S>
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

    pub async fn configure(
        &self,
        config: &RoyaltyConfiguration,
        record: &AssetRecord,
        caller: Address,
    ) -> Result<RoyaltyOutcome, DriverError> {
        if !record.status.is_terminal() {
            return Err(DriverError::NotMinted {
                id: record.id,
                status: record.status,
            });
        }
        if record.token_id != Some(config.token_id) {
            return Err(DriverError::InvalidConfiguration(format!(
                "configuration targets token {} but asset {} minted token {:?}",
                config.token_id, record.id, record.token_id
            )));
        }
        if record.contract_address != config.contract_address {
            return Err(DriverError::InvalidConfiguration(format!(
                "configuration targets contract {} but asset {} belongs to {}",
                config.contract_address, record.id, record.contract_address
            )));
        }
        if !record.royalty_status.allows_resubmission() {
            return Err(DriverError::InvalidConfiguration(format!(
                "royalties for asset {} are already confirmed",
                record.id
            )));
        }
        let split = validate_configuration(config)?;

        let _guard = self
            .locks
            .acquire(record.id)
            .ok_or(DriverError::OperationInFlight(record.id))?;

        let contract = config.contract_address;
        let checker = CapabilityChecker::new(&self.gateway);
        let authorized = checker
            .has_capability(contract, Capability::DefaultAdmin, caller)
            .await
            || checker
                .has_capability(contract, Capability::RoyaltyAdmin, caller)
                .await;
        if !authorized {
            return Err(DriverError::Unauthorized {
                caller,
                capability: Capability::RoyaltyAdmin,
                contract,
            });
        }

        let call = configure_call(contract, config.token_id, &split);
        let plan = self
            .gateway
            .simulate(&call, caller)
            .await
            .map_err(|error| DriverError::SimulationFailed(error.to_string()))?;

        let tx_hash = match self.gateway.submit(&plan, &self.signer).await {
            Ok(tx_hash) => tx_hash,
            Err(GatewayError::Signer(SignerError::Rejected)) => {
                debug!(asset = record.id, "royalty signing declined by the user");
                return Err(DriverError::UserRejected);
            }
            Err(error) => return Err(DriverError::SubmissionFailed(error.to_string())),
        };

        if let Err(store_error) = self
            .store
            .update_royalty_submission(record.id, tx_hash, &split.recipients, &split.units)
            .await
        {
            error!(
                asset = record.id,
                %tx_hash,
                %store_error,
                "submitted royalty transaction could not be checkpointed"
            );
            return Err(store_error.into());
        }
        info!(asset = record.id, %tx_hash, "royalty configuration submitted");

        match self
            .gateway
            .await_receipt(tx_hash, self.confirmation_timeout)
            .await
        {
            Ok(Some(receipt)) if receipt.succeeded() => {
                self.store
                    .update_royalty_confirmed(record.id, &split.recipients, &split.units)
                    .await?;
                info!(asset = record.id, %tx_hash, "royalty configuration confirmed");
                Ok(RoyaltyOutcome::Confirmed { tx_hash })
            }
            Ok(Some(receipt)) => {
                let reason = receipt
                    .revert_reason
                    .unwrap_or_else(|| "transaction reverted".to_string());
                self.store.update_royalty_failed(record.id, &reason).await?;
                Err(DriverError::ConfirmationFailed(reason))
            }
            Ok(None) => {
                info!(
                    asset = record.id,
                    %tx_hash,
                    "royalty confirmation timed out; transaction may still confirm"
                );
                Ok(RoyaltyOutcome::Pending { tx_hash })
            }
            Err(error) => {
                warn!(asset = record.id, %tx_hash, %error, "receipt lookup failed");
                Ok(RoyaltyOutcome::Pending { tx_hash })
            }
        }
    }
}
