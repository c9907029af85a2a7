pub mod api;
pub mod app_config;
pub mod cluster;
pub mod dispatcher_worker;

pub use api::ApiConfig;
pub use app_config::AppConfig;
pub use cluster::ClusterConfig;
pub use dispatcher_worker::{CoordinatorConfig, WorkerConfig};
