use atelier_sdk_rpc::{CallPlan, SignedTransaction, SignerError, TransactionSigner};

/// A signer that approves everything it is shown.
#[derive(Debug, Default, Clone, Copy)]
pub struct ApprovingSigner;

impl TransactionSigner for ApprovingSigner {
    async fn sign(&self, plan: &CallPlan) -> Result<SignedTransaction, SignerError> {
        Ok(SignedTransaction {
            payload: format!("signed:{}:{}", plan.sender, plan.call.method),
        })
    }
}

/// A signer that declines everything, like a user dismissing the wallet
/// prompt.
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectingSigner;

impl TransactionSigner for RejectingSigner {
    async fn sign(&self, _plan: &CallPlan) -> Result<SignedTransaction, SignerError> {
        Err(SignerError::Rejected)
    }
}
