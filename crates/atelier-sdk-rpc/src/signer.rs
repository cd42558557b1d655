use std::future::Future;

use thiserror::Error;

use crate::{CallPlan, SignedTransaction};

/// Errors you can get while asking a signer for a signature.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignerError {
    /// The user declined to sign. This is a deliberate choice, not a fault,
    /// and callers must not log or retry it as one.
    #[error("the signer declined the transaction")]
    Rejected,

    #[error("signing failed: {0}")]
    Failure(String),
}

/// The wallet seam: turns an approved call plan into a signed transaction.
///
/// Implementations wrap a browser wallet, a keystore, or a test double. The
/// orchestration core never sees key material.
pub trait TransactionSigner {
    fn sign(
        &self,
        plan: &CallPlan,
    ) -> impl Future<Output = Result<SignedTransaction, SignerError>>;
}
