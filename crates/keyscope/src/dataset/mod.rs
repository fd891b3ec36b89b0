//! Dataset model: tagged scalar values and the immutable tabular store.

mod table;
mod value;

pub use table::Dataset;
pub use value::Value;
