//! Port contracts for the two capabilities the mirror consumes: the remote
//! marketplace and the local persistence store.

mod marketplace;
mod store;

pub use marketplace::{MarketplaceClient, MarketplaceError, MarketplaceResult};
pub use store::{MirrorStore, StoreError, StoreResult};
