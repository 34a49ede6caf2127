pub mod error;
pub mod ids;

pub use error::{Context, Error, FromMessage, Result, VpsError};
pub use ids::new_id;
