pub mod aggregator;
pub mod core;
pub mod errors;
pub mod schema;
pub mod types;

pub use errors::*;
