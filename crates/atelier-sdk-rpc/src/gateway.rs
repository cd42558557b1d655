use std::future::Future;
use std::time::Duration;

use atelier_sdk_types::{Address, TxHash};
use serde_json::Value;

use crate::{
    ContractCall, CallPlan, GatewayError, LedgerRpcClient, TransactionReceipt, TransactionSigner,
};

/// How long a caller waits for a submitted transaction to confirm before
/// reporting the outcome as pending. Expiry means "unknown, check later",
/// never failure.
pub const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

/// How often [`ContractGateway::await_receipt`] re-queries the ledger.
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// The ledger adapter the orchestration core depends on.
///
/// Signing and connectivity live behind this trait; the orchestrators only
/// ever read state, simulate calls, submit signed transactions, and wait for
/// receipts.
pub trait ContractGateway {
    /// Executes a read-only contract call and returns its decoded value.
    fn read(
        &self,
        call: &ContractCall,
    ) -> impl Future<Output = Result<Value, GatewayError>>;

    /// Dry-runs a call with `sender` as the transaction sender. A failure
    /// here means the ledger would reject the transaction; nothing has been
    /// submitted or mutated.
    fn simulate(
        &self,
        call: &ContractCall,
        sender: Address,
    ) -> impl Future<Output = Result<CallPlan, GatewayError>>;

    /// Signs and submits a planned call, returning the assigned transaction
    /// hash. Signer rejection surfaces as [`GatewayError::Signer`] and leaves
    /// no transaction behind.
    fn submit<S: TransactionSigner>(
        &self,
        plan: &CallPlan,
        signer: &S,
    ) -> impl Future<Output = Result<TxHash, GatewayError>>;

    /// Fetches the receipt for a transaction, or `None` while it is still
    /// unconfirmed.
    fn get_receipt(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = Result<Option<TransactionReceipt>, GatewayError>>;

    /// Polls [`get_receipt`](Self::get_receipt) until the transaction
    /// confirms or `timeout` elapses. `Ok(None)` means the outcome is still
    /// unknown; the transaction may confirm later and must not be treated as
    /// failed.
    fn await_receipt(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> impl Future<Output = Result<Option<TransactionReceipt>, GatewayError>> {
        async move {
            let deadline = tokio::time::Instant::now() + timeout;
            loop {
                if let Some(receipt) = self.get_receipt(tx_hash).await? {
                    return Ok(Some(receipt));
                }
                let now = tokio::time::Instant::now();
                if now >= deadline {
                    return Ok(None);
                }
                tokio::time::sleep((deadline - now).min(RECEIPT_POLL_INTERVAL)).await;
            }
        }
    }
}

impl<T: ContractGateway> ContractGateway for &T {
    fn read(
        &self,
        call: &ContractCall,
    ) -> impl Future<Output = Result<Value, GatewayError>> {
        (**self).read(call)
    }

    fn simulate(
        &self,
        call: &ContractCall,
        sender: Address,
    ) -> impl Future<Output = Result<CallPlan, GatewayError>> {
        (**self).simulate(call, sender)
    }

    fn submit<S: TransactionSigner>(
        &self,
        plan: &CallPlan,
        signer: &S,
    ) -> impl Future<Output = Result<TxHash, GatewayError>> {
        (**self).submit(plan, signer)
    }

    fn get_receipt(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = Result<Option<TransactionReceipt>, GatewayError>> {
        (**self).get_receipt(tx_hash)
    }
}

/// A [`ContractGateway`] over a [`LedgerRpcClient`] transport.
#[derive(Debug, Clone)]
pub struct RpcContractGateway<C> {
    client: C,
}

impl<C: LedgerRpcClient> RpcContractGateway<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: LedgerRpcClient> ContractGateway for RpcContractGateway<C> {
    async fn read(&self, call: &ContractCall) -> Result<Value, GatewayError> {
        let response = self
            .client
            .call_contract(call)
            .await
            .map_err(|error| GatewayError::Transport(error.to_string()))?;
        if !response.success {
            return Err(GatewayError::Rpc(
                response.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        response
            .value
            .ok_or_else(|| GatewayError::MalformedResponse("missing call value".to_string()))
    }

    async fn simulate(
        &self,
        call: &ContractCall,
        sender: Address,
    ) -> Result<CallPlan, GatewayError> {
        let response = self
            .client
            .simulate_call(call, sender)
            .await
            .map_err(|error| GatewayError::Transport(error.to_string()))?;
        if !response.success {
            return Err(GatewayError::Simulation(
                response.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        let gas_estimate = response.gas_estimate.ok_or_else(|| {
            GatewayError::MalformedResponse("missing gas estimate".to_string())
        })?;
        Ok(CallPlan {
            call: call.clone(),
            sender,
            gas_estimate,
        })
    }

    async fn submit<S: TransactionSigner>(
        &self,
        plan: &CallPlan,
        signer: &S,
    ) -> Result<TxHash, GatewayError> {
        let transaction = signer.sign(plan).await?;
        let response = self
            .client
            .send_transaction(&transaction)
            .await
            .map_err(|error| GatewayError::Transport(error.to_string()))?;
        if !response.success {
            return Err(GatewayError::Submission(
                response.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        response
            .tx_hash
            .ok_or_else(|| GatewayError::MalformedResponse("missing transaction hash".to_string()))
    }

    async fn get_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, GatewayError> {
        let response = self
            .client
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|error| GatewayError::Transport(error.to_string()))?;
        if !response.success {
            return Err(GatewayError::Rpc(
                response.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        Ok(response.receipt)
    }
}
