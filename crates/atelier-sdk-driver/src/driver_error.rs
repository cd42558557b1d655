use atelier_sdk_store::StoreError;
use atelier_sdk_types::{Address, AssetStatus, Capability};
use thiserror::Error;

/// The failure taxonomy of the mint and royalty pipelines.
///
/// Variants before `SimulationFailed` are detected without touching the
/// ledger; nothing has been simulated or submitted when they surface.
/// `UserRejected` and `SubmissionFailed` leave no persisted hash behind and
/// are safe to retry. `ConfirmationFailed` means the transaction reverted and
/// a retry requires a new transaction. A confirmation timeout is not an error
/// at all; it surfaces as a pending outcome on the success path.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("caller {caller} does not hold the {capability} capability on {contract}")]
    Unauthorized {
        caller: Address,
        capability: Capability,
        contract: Address,
    },

    #[error("invalid royalty configuration: {0}")]
    InvalidConfiguration(String),

    #[error("asset {id} cannot be minted from status {status}")]
    NotMintable { id: u64, status: AssetStatus },

    #[error("asset {id} is not minted (status {status})")]
    NotMinted { id: u64, status: AssetStatus },

    #[error("another operation is already in flight for asset {0}")]
    OperationInFlight(u64),

    #[error("simulation failed: {0}")]
    SimulationFailed(String),

    #[error("the signer declined the transaction")]
    UserRejected,

    #[error("submission failed: {0}")]
    SubmissionFailed(String),

    #[error("transaction reverted: {0}")]
    ConfirmationFailed(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
