use thiserror::Error;

use crate::SignerError;

/// Errors surfaced by the contract gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never reached the ledger node, or the response could not
    /// be read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered, but reported a query failure.
    #[error("ledger node error: {0}")]
    Rpc(String),

    /// The ledger would reject the call; nothing was submitted.
    #[error("simulation failed: {0}")]
    Simulation(String),

    /// The node refused the signed transaction; no hash was assigned.
    #[error("submission failed: {0}")]
    Submission(String),

    /// Signing failed or was declined before submission.
    #[error(transparent)]
    Signer(#[from] SignerError),

    /// The node's response was missing a field the protocol requires.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
