//! CLI command implementations.

pub mod simulate;

pub use simulate::{execute_simulate, validate_args, SimulateArgs};
