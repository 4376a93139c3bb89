//! Configuration validation
//!
//! - `trait_def`: core Validate trait definition
//! - `config_validators`: validators for each configuration section
//! - `tests`: test suite for all validators

mod config_validators;
mod trait_def;

pub use trait_def::Validate;
