use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use atelier_sdk_rpc::{
    CallPlan, ContractCall, ContractGateway, GatewayError, TransactionReceipt, TransactionSigner,
};
use atelier_sdk_types::{Address, Capability, TxHash};
use parking_lot::Mutex;
use serde_json::Value;

#[derive(Debug, Default)]
struct LedgerState {
    grants: HashSet<(Address, String, Address)>,
    reads: HashMap<String, Value>,
    read_failures: VecDeque<String>,
    simulate_failures: VecDeque<String>,
    submit_failures: VecDeque<String>,
    receipt_failures: VecDeque<String>,
    forced_hashes: VecDeque<TxHash>,
    receipts: HashMap<TxHash, TransactionReceipt>,
    next_hash: u8,
    read_calls: usize,
    simulate_calls: usize,
    submit_calls: usize,
    receipt_calls: usize,
    simulated: Vec<(ContractCall, Address)>,
    submitted: Vec<CallPlan>,
}

/// A [`ContractGateway`] double with scripted outcomes and call recording.
///
/// By default every simulation succeeds, every submission is assigned a fresh
/// hash, and no transaction ever confirms (so awaits time out). Tests script
/// the deviations they need: capability grants, canned reads, queued
/// failures, and receipts keyed by hash.
#[derive(Debug, Default, Clone)]
pub struct ScriptedLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl ScriptedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants `capability` to `address` on `contract`.
    pub fn grant(&self, contract: Address, capability: Capability, address: Address) {
        self.state
            .lock()
            .grants
            .insert((contract, capability.role_name().to_string(), address));
    }

    /// Registers a canned value for read calls to `method`.
    pub fn set_read(&self, method: &str, value: Value) {
        self.state.lock().reads.insert(method.to_string(), value);
    }

    /// Makes the next read call fail with `reason`.
    pub fn fail_next_read(&self, reason: &str) {
        self.state.lock().read_failures.push_back(reason.to_string());
    }

    /// Makes the next simulation fail with `reason`.
    pub fn fail_next_simulation(&self, reason: &str) {
        self.state
            .lock()
            .simulate_failures
            .push_back(reason.to_string());
    }

    /// Makes the next submission fail with `reason` after signing.
    pub fn fail_next_submission(&self, reason: &str) {
        self.state
            .lock()
            .submit_failures
            .push_back(reason.to_string());
    }

    /// Makes the next receipt lookup fail with `reason`.
    pub fn fail_next_receipt_lookup(&self, reason: &str) {
        self.state
            .lock()
            .receipt_failures
            .push_back(reason.to_string());
    }

    /// Forces the next submission to return `tx_hash`.
    pub fn expect_tx_hash(&self, tx_hash: TxHash) {
        self.state.lock().forced_hashes.push_back(tx_hash);
    }

    /// Makes the receipt for its transaction hash available to lookups.
    pub fn push_receipt(&self, receipt: TransactionReceipt) {
        self.state.lock().receipts.insert(receipt.tx_hash, receipt);
    }

    pub fn read_calls(&self) -> usize {
        self.state.lock().read_calls
    }

    pub fn simulate_calls(&self) -> usize {
        self.state.lock().simulate_calls
    }

    pub fn submit_calls(&self) -> usize {
        self.state.lock().submit_calls
    }

    pub fn receipt_calls(&self) -> usize {
        self.state.lock().receipt_calls
    }

    /// Every simulated call so far, with its sender.
    pub fn simulated(&self) -> Vec<(ContractCall, Address)> {
        self.state.lock().simulated.clone()
    }

    /// Every plan that reached submission so far.
    pub fn submitted(&self) -> Vec<CallPlan> {
        self.state.lock().submitted.clone()
    }

    fn answer_capability_query(state: &LedgerState, call: &ContractCall) -> Result<Value, GatewayError> {
        let args = call
            .args
            .as_array()
            .filter(|args| args.len() == 2)
            .ok_or_else(|| GatewayError::Rpc("malformed capability query".to_string()))?;
        let role = args[0]
            .as_str()
            .ok_or_else(|| GatewayError::Rpc("malformed capability role".to_string()))?;
        let address: Address = args[1]
            .as_str()
            .and_then(|text| text.parse().ok())
            .ok_or_else(|| GatewayError::Rpc("malformed capability address".to_string()))?;
        let granted = state
            .grants
            .contains(&(call.contract, role.to_string(), address));
        Ok(Value::Bool(granted))
    }
}

impl ContractGateway for ScriptedLedger {
    async fn read(&self, call: &ContractCall) -> Result<Value, GatewayError> {
        let mut state = self.state.lock();
        state.read_calls += 1;
        if let Some(reason) = state.read_failures.pop_front() {
            return Err(GatewayError::Rpc(reason));
        }
        if call.method == "has_capability" {
            return Self::answer_capability_query(&state, call);
        }
        state
            .reads
            .get(&call.method)
            .cloned()
            .ok_or_else(|| GatewayError::Rpc(format!("no scripted read for {}", call.method)))
    }

    async fn simulate(
        &self,
        call: &ContractCall,
        sender: Address,
    ) -> Result<CallPlan, GatewayError> {
        let mut state = self.state.lock();
        state.simulate_calls += 1;
        state.simulated.push((call.clone(), sender));
        if let Some(reason) = state.simulate_failures.pop_front() {
            return Err(GatewayError::Simulation(reason));
        }
        Ok(CallPlan {
            call: call.clone(),
            sender,
            gas_estimate: 21_000,
        })
    }

    async fn submit<S: TransactionSigner>(
        &self,
        plan: &CallPlan,
        signer: &S,
    ) -> Result<TxHash, GatewayError> {
        let transaction = signer.sign(plan).await?;
        debug_assert!(!transaction.payload.is_empty());

        let mut state = self.state.lock();
        state.submit_calls += 1;
        if let Some(reason) = state.submit_failures.pop_front() {
            return Err(GatewayError::Submission(reason));
        }
        state.submitted.push(plan.clone());
        if let Some(tx_hash) = state.forced_hashes.pop_front() {
            return Ok(tx_hash);
        }
        state.next_hash += 1;
        let mut bytes = [0; 32];
        bytes[31] = state.next_hash;
        Ok(TxHash::new(bytes))
    }

    async fn get_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, GatewayError> {
        let mut state = self.state.lock();
        state.receipt_calls += 1;
        if let Some(reason) = state.receipt_failures.pop_front() {
            return Err(GatewayError::Rpc(reason));
        }
        Ok(state.receipts.get(&tx_hash).cloned())
    }
}
