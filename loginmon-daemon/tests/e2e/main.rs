//! End-to-end tests for loginmon-daemon.
//!
//! Each scenario starts a real [`Orchestrator`](loginmon_daemon::orchestrator::Orchestrator)
//! against an auth log in a temporary directory, an in-memory store writer
//! and a channel-backed Docker event source, then checks the points that
//! reach the store.

mod helpers;
mod scenarios;
