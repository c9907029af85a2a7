use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use flint_core::{
    diagnostics,
    protocol::{self, Operation},
    DispatchResult, Interest, InterestConfig, Name, RequestOutcome, Signer, Transport, Verifier,
};

/// 单次请求的发送参数
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub must_be_fresh: bool,
    pub lifetime: Duration,
    /// 不指定时随机生成
    pub nonce: Option<u32>,
    /// 附加应用参数后请求名会以 `params-sha256=` 组件封口
    pub app_parameters: Option<Vec<u8>>,
    /// 使用客户端的签名器对请求签名
    pub sign: bool,
    /// 使用客户端的验证器校验返回的数据包签名
    pub validate: bool,
}

impl DispatchOptions {
    /// 就绪探测：不带参数、不签名、不校验
    pub fn probe(lifetime: Duration) -> Self {
        Self {
            must_be_fresh: true,
            lifetime,
            nonce: None,
            app_parameters: None,
            sign: false,
            validate: false,
        }
    }

    /// 计算请求：总是带空参数块，以便接收方剥离封口组件
    pub fn request(lifetime: Duration) -> Self {
        Self {
            must_be_fresh: true,
            lifetime,
            nonce: None,
            app_parameters: Some(Vec::new()),
            sign: true,
            validate: true,
        }
    }

    fn interest_config(&self) -> InterestConfig {
        InterestConfig {
            must_be_fresh: self.must_be_fresh,
            lifetime: self.lifetime,
            nonce: self.nonce,
        }
    }
}

/// 已发出请求的结果。传输层的回调只会触发一次；
/// 回调被丢弃而从未触发时视为超时。
pub struct PendingRequest {
    name: Name,
    rx: oneshot::Receiver<RequestOutcome>,
}

impl PendingRequest {
    pub fn name(&self) -> &Name {
        &self.name
    }
}

impl Future for PendingRequest {
    type Output = RequestOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(RequestOutcome::Timeout))
    }
}

/// 调度客户端
///
/// 把一次请求/响应交换归约为 [`DispatchResult`]：数据包给出成功结果，
/// Nack、超时、取消以及本地失败都转换为固定的诊断文本。
pub struct DispatchClient {
    transport: Arc<dyn Transport>,
    app_prefix: String,
    signer: Option<Arc<dyn Signer>>,
    verifier: Option<Arc<dyn Verifier>>,
}

impl DispatchClient {
    pub fn new(transport: Arc<dyn Transport>, app_prefix: impl Into<String>) -> Self {
        Self {
            transport,
            app_prefix: app_prefix.into(),
            signer: None,
            verifier: None,
        }
    }

    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn Verifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn app_prefix(&self) -> &str {
        &self.app_prefix
    }

    /// 构造并发出请求，返回等待结果的future。
    /// 本地失败直接给出对应的诊断结果。
    pub fn express(&self, name: Name, options: &DispatchOptions) -> Result<PendingRequest, DispatchResult> {
        let signer = if options.sign { self.signer.as_deref() } else { None };
        let interest = Interest::build(
            name.clone(),
            &options.interest_config(),
            options.app_parameters.clone(),
            signer,
        )
        .map_err(|e| {
            error!("构建兴趣包失败 {}: {}", name, e);
            record_outcome("make_interest_failed");
            DispatchResult::failure(diagnostics::MAKE_INTEREST_FAILED)
        })?;

        let sealed_name = interest.name().clone();
        let (tx, rx) = oneshot::channel();
        let callback = Box::new(move |outcome: RequestOutcome| {
            // 请求方已放弃等待时结果无人接收
            let _ = tx.send(outcome);
        });

        self.transport.express(interest, callback).map_err(|e| {
            error!("发送兴趣包失败 {}: {}", sealed_name, e);
            record_outcome("express_failed");
            DispatchResult::failure(diagnostics::EXPRESS_FAILED)
        })?;
        debug!("已发送兴趣包 {}", sealed_name);

        Ok(PendingRequest {
            name: sealed_name,
            rx,
        })
    }

    pub async fn dispatch(&self, name: Name, options: &DispatchOptions) -> DispatchResult {
        self.settle(name, options, None, None).await
    }

    /// 发出请求并等待结果或取消信号，以先到者为准
    pub async fn dispatch_with_cancel(
        &self,
        name: Name,
        options: &DispatchOptions,
        cancel: &CancellationToken,
    ) -> DispatchResult {
        self.settle(name, options, Some(cancel), None).await
    }

    /// 截止时间到达与取消等价
    pub async fn dispatch_with_deadline(
        &self,
        name: Name,
        options: &DispatchOptions,
        deadline: Duration,
    ) -> DispatchResult {
        self.settle(name, options, None, Some(deadline)).await
    }

    /// 调用一个命名操作，例如 `/<prefix>/add/<x>/<y>`
    pub async fn call(
        &self,
        operation: Operation,
        x: i64,
        y: i64,
        lifetime: Duration,
        cancel: &CancellationToken,
        deadline: Option<Duration>,
    ) -> DispatchResult {
        let name = match protocol::app_prefix(&self.app_prefix)
            .and_then(|prefix| protocol::operation_name(&prefix, operation, x, y))
        {
            Ok(name) => name,
            Err(e) => {
                warn!("无法在 '{}' 下构建请求名称: {}", self.app_prefix, e);
                record_outcome("invalid_name");
                return DispatchResult::failure(diagnostics::INVALID_NAME);
            }
        };

        self.settle(name, &DispatchOptions::request(lifetime), Some(cancel), deadline)
            .await
    }

    /// 探测 `/<prefix>/worker/<id>/ready`
    pub async fn probe_ready(&self, worker_id: u32, lifetime: Duration, deadline: Duration) -> DispatchResult {
        let name = match protocol::app_prefix(&self.app_prefix)
            .and_then(|prefix| protocol::readiness_name(&prefix, worker_id))
        {
            Ok(name) => name,
            Err(e) => {
                warn!("无法在 '{}' 下构建就绪名称: {}", self.app_prefix, e);
                record_outcome("invalid_name");
                return DispatchResult::failure(diagnostics::INVALID_NAME);
            }
        };

        self.dispatch_with_deadline(name, &DispatchOptions::probe(lifetime), deadline)
            .await
    }

    async fn settle(
        &self,
        name: Name,
        options: &DispatchOptions,
        cancel: Option<&CancellationToken>,
        deadline: Option<Duration>,
    ) -> DispatchResult {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            debug!("请求 {} 在发送前已取消", name);
            record_outcome("cancelled");
            return DispatchResult::failure(diagnostics::CLIENT_CANCELLED);
        }

        let pending = match self.express(name, options) {
            Ok(pending) => pending,
            Err(result) => return result,
        };
        let sealed_name = pending.name().clone();

        let cancelled = async {
            match cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };
        let expired = async {
            match deadline {
                Some(deadline) => tokio::time::sleep(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            outcome = pending => self.reduce(&sealed_name, outcome, options.validate),
            _ = cancelled => {
                debug!("请求 {} 被调用方取消", sealed_name);
                record_outcome("cancelled");
                DispatchResult::failure(diagnostics::CLIENT_CANCELLED)
            }
            _ = expired => {
                debug!("请求 {} 超过调用方截止时间", sealed_name);
                record_outcome("cancelled");
                DispatchResult::failure(diagnostics::CLIENT_CANCELLED)
            }
        }
    }

    fn reduce(&self, name: &Name, outcome: RequestOutcome, validate: bool) -> DispatchResult {
        match outcome {
            RequestOutcome::Data(data) => {
                if validate {
                    if let Some(verifier) = &self.verifier {
                        if !data.verify_with(verifier.as_ref()) {
                            warn!("{} 的数据包签名校验失败", name);
                            record_outcome("validation_failed");
                            return DispatchResult::failure(diagnostics::VALIDATION_FAILED);
                        }
                    }
                }
                debug!("收到数据包 {}", name);
                record_outcome("data");
                DispatchResult::ok(data.content_text())
            }
            RequestOutcome::Nack(reason) => {
                debug!("收到 {} 的Nack: {}", name, reason);
                record_outcome("nack");
                DispatchResult::nack(reason)
            }
            RequestOutcome::Timeout => {
                debug!("请求 {} 超时", name);
                record_outcome("timeout");
                DispatchResult::failure(diagnostics::TIMEOUT)
            }
        }
    }
}

fn record_outcome(outcome: &'static str) {
    metrics::counter!("flint_dispatch_outcomes_total", "outcome" => outcome).increment(1);
}
