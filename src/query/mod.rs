pub mod types;
pub mod filter;
pub mod order_by;
pub mod parameters;
pub mod error;

pub use types::*;
pub use filter::Filter;
pub use order_by::OrderByQuery;
pub use parameters::{QueryParameters, RawQuery};
pub use error::QueryError;
