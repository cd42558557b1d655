mod capability;
mod driver_error;
mod locks;
mod mint;
mod reconcile;
mod royalty;

pub use capability::*;
pub use driver_error::*;
pub use locks::*;
pub use mint::*;
pub use reconcile::*;
pub use royalty::*;
