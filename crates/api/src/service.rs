use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use flint_core::{ApiConfig, CoordinatorConfig, DispatchResult, Operation};
use flint_dispatcher::DispatchClient;

/// 计算服务
///
/// 每个调用转发为一次调度请求。调用方的截止时间转换为该请求的取消信号；
/// 服务关闭时所有在途请求一并取消。
pub struct ComputeService {
    client: Arc<DispatchClient>,
    request_lifetime: Duration,
    default_timeout: Duration,
    shutdown: CancellationToken,
}

impl ComputeService {
    pub fn new(
        client: Arc<DispatchClient>,
        request_lifetime: Duration,
        default_timeout: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            client,
            request_lifetime,
            default_timeout,
            shutdown,
        }
    }

    pub fn from_config(
        client: Arc<DispatchClient>,
        coordinator: &CoordinatorConfig,
        api: &ApiConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self::new(
            client,
            coordinator.request_lifetime(),
            Duration::from_millis(api.request_timeout_ms),
            shutdown,
        )
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub async fn compute_add(&self, x: i64, y: i64, timeout: Option<Duration>) -> DispatchResult {
        let deadline = timeout.unwrap_or(self.default_timeout);
        let cancel = self.shutdown.child_token();

        let timer = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                tokio::time::sleep(deadline).await;
                cancel.cancel();
            }
        });

        debug!("compute_add({}, {})，截止时间 {:?}", x, y, deadline);
        let result = self
            .client
            .call(Operation::Add, x, y, self.request_lifetime, &cancel, None)
            .await;
        timer.abort();

        result
    }
}
