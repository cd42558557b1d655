//! A toolkit for driving marketplace asset records through on-chain minting
//! and royalty configuration.
//!
//! The member crates are re-exported here so applications can depend on this
//! crate alone:
//!
//! - [`types`] holds the shared domain model: addresses, transaction hashes,
//!   asset records and their status machine, and royalty configurations.
//! - [`rpc`] talks to a ledger node: the [`ContractGateway`](rpc::ContractGateway)
//!   trait, its JSON-RPC implementation, and the simulate/submit/await flow.
//! - [`store`] is the persistence boundary for asset records.
//! - [`driver`] contains the orchestrators that tie the other crates
//!   together: minting, royalty configuration, capability checks, and the
//!   reconciliation sweep.
//! - [`testing`] provides the scripted ledger and fixtures the other crates
//!   test against.

pub use atelier_sdk_driver as driver;
pub use atelier_sdk_rpc as rpc;
pub use atelier_sdk_store as store;
pub use atelier_sdk_test as testing;
pub use atelier_sdk_types as types;
