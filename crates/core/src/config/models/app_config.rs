use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    api::ApiConfig,
    cluster::ClusterConfig,
    dispatcher_worker::{CoordinatorConfig, WorkerConfig},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub cluster: ClusterConfig,
    pub coordinator: CoordinatorConfig,
    pub worker: WorkerConfig,
    pub api: ApiConfig,
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults = AppConfig::default();
        let mut builder = ConfigBuilder::builder()
            .set_default("cluster.app_prefix", defaults.cluster.app_prefix)?
            .set_default("cluster.num_workers", defaults.cluster.num_workers)?
            .set_default("cluster.max_tries", defaults.cluster.max_tries)?
            .set_default(
                "coordinator.probe_lifetime_ms",
                defaults.coordinator.probe_lifetime_ms,
            )?
            .set_default(
                "coordinator.probe_timeout_ms",
                defaults.coordinator.probe_timeout_ms,
            )?
            .set_default(
                "coordinator.probe_interval_ms",
                defaults.coordinator.probe_interval_ms,
            )?
            .set_default(
                "coordinator.request_lifetime_ms",
                defaults.coordinator.request_lifetime_ms,
            )?
            .set_default(
                "coordinator.verify_responses",
                defaults.coordinator.verify_responses,
            )?
            .set_default("worker.manifest_path", defaults.worker.manifest_path)?
            .set_default("worker.keychain_dir", defaults.worker.keychain_dir)?
            .set_default("worker.data_freshness_ms", defaults.worker.data_freshness_ms)?
            .set_default("worker.ready_freshness_ms", defaults.worker.ready_freshness_ms)?
            .set_default("api.enabled", defaults.api.enabled)?
            .set_default("api.bind_address", defaults.api.bind_address)?
            .set_default("api.request_timeout_ms", defaults.api.request_timeout_ms)?;

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else {
            let default_paths = ["config/flint.toml", "flint.toml", "/etc/flint/config.toml"];
            if let Some(path) = default_paths.iter().find(|p| Path::new(p).exists()) {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            }
        }

        builder = builder
            .add_source(
                Environment::with_prefix("FLINT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("cluster.app_prefix", std::env::var("APP_PREFIX").ok())?
            .set_override_option("cluster.num_workers", std::env::var("WORKERS").ok())?;

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    pub fn validate(&self) -> Result<()> {
        self.cluster.validate().context("集群配置验证失败")?;
        self.coordinator
            .validate()
            .context("Coordinator配置验证失败")?;
        self.worker.validate().context("Worker配置验证失败")?;
        self.api.validate().context("API配置验证失败")?;
        Ok(())
    }
}
