//! Worker side of the compute cluster: request handlers and node assembly.

pub mod components;

pub use components::{worker_key_name, AddHandler, ReadyResponder, WorkerNode, WorkerNodeConfig};
