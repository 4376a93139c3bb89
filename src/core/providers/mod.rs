//! Remote batch API adapters

pub mod openai;

pub use openai::OpenAiBatchClient;
