//! E2E test scenarios.

mod auth_flow;
mod docker_flow;
mod fault_isolation;
mod startup;
