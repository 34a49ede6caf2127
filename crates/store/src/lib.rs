//! C9 Store Port — abstract persistence interface the core consumes (§4.9).

pub mod error;
pub mod memory;
pub mod port;
pub mod types;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use port::Store;
pub use types::UserApiKey;
