use atelier_sdk_types::{Address, TxHash};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A contract method invocation, before any gas estimation or signing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractCall {
    pub contract: Address,
    pub method: String,
    /// Positional arguments, already JSON-encoded the way the ledger API
    /// expects them.
    pub args: Value,
}

impl ContractCall {
    pub fn new(contract: Address, method: impl Into<String>, args: Value) -> Self {
        Self {
            contract,
            method: method.into(),
            args,
        }
    }
}

/// A simulated call that the ledger agreed to execute, ready to be signed
/// and submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallPlan {
    pub call: ContractCall,
    pub sender: Address,
    pub gas_estimate: u64,
}

/// A signed transaction payload, opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub payload: String,
}

/// Whether a confirmed transaction executed or reverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    Succeeded,
    Reverted,
}

/// The ledger's confirmation record for a submitted transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub status: ReceiptStatus,
    pub sender: Address,
    /// The token identifier emitted by a mint, when the transaction was one.
    pub token_id: Option<u64>,
    pub contract: Option<Address>,
    pub revert_reason: Option<String>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status == ReceiptStatus::Succeeded
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallContractResponse {
    pub success: bool,
    pub error: Option<String>,
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulateCallResponse {
    pub success: bool,
    pub error: Option<String>,
    pub gas_estimate: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SendTransactionResponse {
    pub success: bool,
    pub error: Option<String>,
    pub tx_hash: Option<TxHash>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GetReceiptResponse {
    pub success: bool,
    pub error: Option<String>,
    pub receipt: Option<TransactionReceipt>,
}
