//! # Flint Testing Utils
//!
//! Shared testing utilities for the workspace.
//!
//! - **ScriptedTransport**: a [`Transport`](flint_core::Transport) whose outcomes are scripted per name prefix
//! - **Reply capture**: repliers that record what a handler answered
//! - **Builders**: manifest builders with sensible defaults
//!
//! ## Usage
//!
//! ```toml
//! [dev-dependencies]
//! flint-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

// Re-export commonly used items
pub use builders::*;
pub use helpers::*;
pub use mocks::*;
