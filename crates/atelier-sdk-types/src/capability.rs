use std::fmt;

use serde::{Deserialize, Serialize};

/// An on-chain role granted to an address by a contract.
///
/// Grants are derived facts read from ledger state. They are never cached or
/// persisted off-chain, since they can change between any two checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Allows minting new tokens on a collection contract.
    Minter,
    /// The contract-wide admin role, which implies royalty administration.
    DefaultAdmin,
    /// Allows configuring royalty splits without full admin rights.
    RoyaltyAdmin,
}

impl Capability {
    /// The role name as the ledger contracts spell it.
    pub const fn role_name(self) -> &'static str {
        match self {
            Self::Minter => "minter",
            Self::DefaultAdmin => "default_admin",
            Self::RoyaltyAdmin => "royalty_admin",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.role_name())
    }
}
