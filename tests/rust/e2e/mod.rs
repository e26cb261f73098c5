//! End-to-end tests.
//!
//! The core is a pure source-to-source compiler: it never executes
//! KQL, maintains no live graph state, and performs no network I/O
//! (spec.md §1 Non-goals). There is no running Sentinel workspace to
//! drive from this crate, so "end to end" here means the full
//! `translate`/`validate` pipeline exercised against literal scenarios
//! - which `tests/rust/integration/scenario_tests.rs` already covers.
//! This module is a placeholder for a future harness that replays
//! captured Sentinel query results against emitted KQL, once that
//! out-of-process fixture exists.

#[cfg(test)]
mod tests {}
