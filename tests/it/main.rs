//! Single test binary entry point.
//!
//! All tests compile into one binary to keep linking cheap.
//!
//! Structure:
//! - helpers: engine builders, recording collaborators, fixtures
//! - unit: single-component tests
//! - integration: end-to-end engine workflows

mod helpers;
mod integration;
mod unit;
