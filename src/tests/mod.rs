//! Cross-module tests: orchestrator and crumb behavior, retries, and round
//! trips against an in-process server.

pub(crate) mod support;

mod fake_jenkins;
