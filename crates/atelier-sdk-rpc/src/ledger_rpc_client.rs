use std::future::Future;

use atelier_sdk_types::{Address, TxHash};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    CallContractResponse, ContractCall, GetReceiptResponse, SendTransactionResponse,
    SignedTransaction, SimulateCallResponse,
};

/// The ledger node's HTTP API, one POST endpoint per operation.
///
/// Implementations only provide the transport; the endpoint methods are
/// derived from it, so a mock transport exercises the exact same request
/// bodies as the production client.
pub trait LedgerRpcClient {
    type Error: std::fmt::Display;

    fn base_url(&self) -> &str;

    fn make_post_request<R, B>(
        &self,
        endpoint: &str,
        body: B,
    ) -> impl Future<Output = Result<R, Self::Error>>
    where
        B: Serialize + Send,
        R: DeserializeOwned + Send;

    fn call_contract(
        &self,
        call: &ContractCall,
    ) -> impl Future<Output = Result<CallContractResponse, Self::Error>> {
        self.make_post_request(
            "call_contract",
            serde_json::json!({
                "contract": call.contract,
                "method": call.method,
                "args": call.args,
            }),
        )
    }

    fn simulate_call(
        &self,
        call: &ContractCall,
        sender: Address,
    ) -> impl Future<Output = Result<SimulateCallResponse, Self::Error>> {
        self.make_post_request(
            "simulate_call",
            serde_json::json!({
                "contract": call.contract,
                "method": call.method,
                "args": call.args,
                "sender": sender,
            }),
        )
    }

    fn send_transaction(
        &self,
        transaction: &SignedTransaction,
    ) -> impl Future<Output = Result<SendTransactionResponse, Self::Error>> {
        self.make_post_request(
            "send_transaction",
            serde_json::json!({
                "payload": transaction.payload,
            }),
        )
    }

    fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> impl Future<Output = Result<GetReceiptResponse, Self::Error>> {
        self.make_post_request(
            "get_transaction_receipt",
            serde_json::json!({
                "tx_hash": tx_hash,
            }),
        )
    }
}
