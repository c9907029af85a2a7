pub mod add_handler;
pub mod ready_responder;
pub mod worker_node;

pub use add_handler::AddHandler;
pub use ready_responder::ReadyResponder;
pub use worker_node::{worker_key_name, WorkerNode, WorkerNodeConfig};
