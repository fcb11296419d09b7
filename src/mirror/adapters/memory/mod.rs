//! In-memory adapters for both ports.

mod marketplace;
mod store;

pub use marketplace::{BonusGrant, InMemoryMarketplace};
pub use store::InMemoryMirrorStore;
