use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// 存活探测请求的生命周期（毫秒）
    pub probe_lifetime_ms: u64,
    /// 单次探测的总等待上限（毫秒），必须大于生命周期
    pub probe_timeout_ms: u64,
    /// 两次探测之间的固定间隔（毫秒）
    pub probe_interval_ms: u64,
    /// 计算请求的生命周期（毫秒）
    pub request_lifetime_ms: u64,
    /// 是否校验Worker响应的签名
    pub verify_responses: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            probe_lifetime_ms: 2000,
            probe_timeout_ms: 3000,
            probe_interval_ms: 500,
            request_lifetime_ms: 4000,
            verify_responses: true,
        }
    }
}

impl CoordinatorConfig {
    pub fn probe_lifetime(&self) -> Duration {
        Duration::from_millis(self.probe_lifetime_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }

    pub fn request_lifetime(&self) -> Duration {
        Duration::from_millis(self.request_lifetime_ms)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.probe_lifetime_ms == 0 || self.probe_timeout_ms == 0 {
            return Err(anyhow::anyhow!("探测超时时间必须大于0"));
        }

        if self.probe_lifetime_ms >= self.probe_timeout_ms {
            return Err(anyhow::anyhow!(
                "探测生命周期({}ms)必须小于探测超时({}ms)",
                self.probe_lifetime_ms,
                self.probe_timeout_ms
            ));
        }

        if self.request_lifetime_ms == 0 {
            return Err(anyhow::anyhow!("请求生命周期必须大于0"));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// 分片清单文件路径
    pub manifest_path: String,
    /// 密钥目录，每个Worker在其下使用 worker-<id> 子目录
    pub keychain_dir: String,
    /// 计算结果的新鲜期（毫秒）
    pub data_freshness_ms: u64,
    /// 就绪响应的新鲜期（毫秒）
    pub ready_freshness_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            manifest_path: "/app/manifest/fs-manifest.json".to_string(),
            keychain_dir: "/opt/worker_keychain".to_string(),
            data_freshness_ms: 5000,
            ready_freshness_ms: 1000,
        }
    }
}

impl WorkerConfig {
    pub fn data_freshness(&self) -> Duration {
        Duration::from_millis(self.data_freshness_ms)
    }

    pub fn ready_freshness(&self) -> Duration {
        Duration::from_millis(self.ready_freshness_ms)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.keychain_dir.is_empty() {
            return Err(anyhow::anyhow!("密钥目录不能为空"));
        }

        if self.data_freshness_ms == 0 || self.ready_freshness_ms == 0 {
            return Err(anyhow::anyhow!("新鲜期必须大于0"));
        }

        Ok(())
    }
}
