//! Candidate key validation and minimal-key reduction.

mod reducer;
mod validator;

pub use reducer::{find_minimal_key, MinimalKeyResult, ReductionStep, StepAction};
pub use validator::{validate, KeyValidationResult};
