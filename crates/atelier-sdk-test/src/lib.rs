mod fixtures;
mod scripted_ledger;
mod signers;

pub use fixtures::*;
pub use scripted_ledger::*;
pub use signers::*;
