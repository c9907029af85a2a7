use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// 应用名称前缀，例如 "ndn-compute"
    pub app_prefix: String,
    /// Worker 数量，Worker ID 为 1..=num_workers
    pub num_workers: u32,
    /// 存活探测的最大尝试次数
    pub max_tries: u32,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            app_prefix: "ndn-compute".to_string(),
            num_workers: 2,
            max_tries: 10,
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.app_prefix.trim_matches('/').is_empty() {
            return Err(anyhow::anyhow!("应用前缀不能为空"));
        }

        if self.max_tries == 0 {
            return Err(anyhow::anyhow!("最大尝试次数必须大于0"));
        }

        Ok(())
    }
}
