//! Utility modules for the reconciler
//!
//! - **error**: Error types shared by the engine and its adapters
//! - **logging**: Tracing subscriber setup

pub mod error;
pub mod logging;

pub use logging::init_logging;
