//! Integration tests for word-query-reconciler
//!
//! These tests verify the interaction between the engine and its adapters.

pub mod engine_properties_tests;
pub mod failure_handling_tests;
pub mod openai_client_tests;
