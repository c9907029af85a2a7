//! 配置管理
//!
//! 配置按以下顺序叠加（后者覆盖前者）：
//!
//! 1. 内置默认值（[`AppConfig::default`]）
//! 2. TOML 配置文件（可选）
//! 3. `FLINT_` 前缀的环境变量，分段使用 `__`，例如 `FLINT_CLUSTER__NUM_WORKERS=4`
//! 4. 兼容旧部署的环境变量 `APP_PREFIX`、`WORKERS`

pub mod models;

pub use models::{ApiConfig, AppConfig, ClusterConfig, CoordinatorConfig, WorkerConfig};
