//! Shared test helpers for E2E scenarios.

pub mod env;
pub mod events;
pub mod mock_docker;
pub mod mock_writer;
