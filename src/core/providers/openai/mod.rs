//! OpenAI batch and file API client

mod client;

pub use client::OpenAiBatchClient;
