//! Coordinator side of the compute cluster: the dispatch client that turns a
//! named request into a [`flint_core::DispatchResult`], and the liveness
//! barrier that waits for every worker to answer its readiness check.

pub mod client;
pub mod liveness;

pub use client::{DispatchClient, DispatchOptions, PendingRequest};
pub use liveness::{LivenessConfig, LivenessProber, LivenessReport, WorkerState};
