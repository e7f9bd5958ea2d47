pub mod demo;
mod json;
mod validation;

pub use json::{load_snapshot_from_dir, InputConfig};
pub use validation::{validate_input, ValidationResult};
