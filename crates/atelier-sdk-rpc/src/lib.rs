mod error;
mod gateway;
mod http_client;
mod ledger_rpc_client;
mod mock_client;
mod models;
mod signer;

pub use error::*;
pub use gateway::*;
pub use http_client::*;
pub use ledger_rpc_client::*;
pub use mock_client::*;
pub use models::*;
pub use signer::*;
