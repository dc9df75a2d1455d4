mod ops;

pub use ops::{AggregateBinding, combine, supports};
