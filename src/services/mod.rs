// Service exports
pub mod store;

pub use store::{StoreClient, StoreCollections, StoreError};
