use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, error, info};

use flint_core::{CoordinatorConfig, FlintError, FlintResult};

use crate::client::DispatchClient;

/// 就绪屏障配置
#[derive(Debug, Clone)]
pub struct LivenessConfig {
    /// 探测请求的生命周期
    pub probe_lifetime: Duration,
    /// 单次探测的截止时间
    pub probe_timeout: Duration,
    /// 两次探测之间的固定间隔
    pub probe_interval: Duration,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            probe_lifetime: Duration::from_secs(2),
            probe_timeout: Duration::from_secs(3),
            probe_interval: Duration::from_millis(500),
        }
    }
}

impl From<&CoordinatorConfig> for LivenessConfig {
    fn from(config: &CoordinatorConfig) -> Self {
        Self {
            probe_lifetime: config.probe_lifetime(),
            probe_timeout: config.probe_timeout(),
            probe_interval: config.probe_interval(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerState {
    pub id: u32,
    pub ready: bool,
    /// 失败的探测次数
    pub attempts: u32,
}

impl WorkerState {
    fn new(id: u32) -> Self {
        Self {
            id,
            ready: false,
            attempts: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LivenessReport {
    pub workers: Vec<WorkerState>,
    pub elapsed: Duration,
}

impl LivenessReport {
    pub fn total_failed_attempts(&self) -> u32 {
        self.workers.iter().map(|w| w.attempts).sum()
    }
}

/// 就绪屏障
///
/// 按编号顺序依次探测尚未就绪的Worker，每次探测后固定休眠一个间隔。
/// 一个Worker一旦就绪就不再探测；任何一个Worker的失败次数达到上限时立即中止。
pub struct LivenessProber {
    client: Arc<DispatchClient>,
    config: LivenessConfig,
}

impl LivenessProber {
    pub fn new(client: Arc<DispatchClient>, config: LivenessConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &LivenessConfig {
        &self.config
    }

    /// 单次探测，只有收到数据包才算就绪
    pub async fn probe(&self, worker_id: u32) -> bool {
        let result = self
            .client
            .probe_ready(worker_id, self.config.probe_lifetime, self.config.probe_timeout)
            .await;
        if !result.success {
            debug!("Worker {} 探测失败: {}", worker_id, result.result);
        }
        result.success
    }

    /// 阻塞直到编号 1..=num_workers 的Worker全部就绪
    pub async fn ensure_workers_available(&self, num_workers: u32, max_tries: u32) -> FlintResult<LivenessReport> {
        if max_tries == 0 {
            return Err(FlintError::InvalidRetryBudget(max_tries));
        }

        let started = Instant::now();
        let mut workers: Vec<WorkerState> = (1..=num_workers).map(WorkerState::new).collect();

        while workers.iter().any(|w| !w.ready) {
            for worker in workers.iter_mut().filter(|w| !w.ready) {
                if worker.attempts >= max_tries {
                    error!(
                        "Worker {} 在 {} 次尝试后仍未就绪",
                        worker.id, worker.attempts
                    );
                    return Err(FlintError::WorkerUnavailable {
                        worker_id: worker.id,
                        attempts: worker.attempts,
                    });
                }

                info!(
                    "探测 /{}/worker/{}/ready（第 {} 次）",
                    self.client.app_prefix().trim_matches('/'),
                    worker.id,
                    worker.attempts + 1
                );
                if self.probe(worker.id).await {
                    info!("Worker {} 已就绪", worker.id);
                    worker.ready = true;
                } else {
                    worker.attempts += 1;
                }

                sleep(self.config.probe_interval).await;
            }
        }

        info!("全部 {} 个Worker已就绪", num_workers);
        Ok(LivenessReport {
            workers,
            elapsed: started.elapsed(),
        })
    }
}
