mod address;
mod asset;
mod capability;
mod content_id;
mod royalty;
mod tx_hash;

pub use address::*;
pub use asset::*;
pub use capability::*;
pub use content_id::*;
pub use royalty::*;
pub use tx_hash::*;
