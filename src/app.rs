use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use flint_api::{create_app, ComputeService};
use flint_core::{AppConfig, DispatchResult, Name, Signer, Transport};
use flint_dispatcher::{DispatchClient, LivenessConfig, LivenessProber, LivenessReport};
use flint_infrastructure::{load_or_create_signer, LoopbackTransport, TrustStore};
use flint_worker::{worker_key_name, WorkerNode, WorkerNodeConfig};
use tokio::{net::TcpListener, sync::broadcast};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const COORDINATOR_KEY_NAME: &str = "/local/coordinator/ecdsa-key";

/// 嵌入式计算集群
///
/// 在同一进程内通过回环传输运行协调者和全部Worker。
pub struct Application {
    config: AppConfig,
    transport: Arc<LoopbackTransport>,
    client: Arc<DispatchClient>,
    workers: Vec<WorkerNode>,
    shutdown: CancellationToken,
}

impl Application {
    /// 启动传输层和所有Worker，构建调度客户端
    pub async fn new(config: AppConfig, shutdown: CancellationToken) -> Result<Self> {
        info!(
            "初始化计算集群: prefix={}, workers={}",
            config.cluster.app_prefix, config.cluster.num_workers
        );

        let transport = Arc::new(LoopbackTransport::new());
        transport.start().await.context("启动传输层失败")?;

        let keychain_dir = Path::new(&config.worker.keychain_dir);
        let node_config = WorkerNodeConfig::from(&config);
        let mut trust_store = TrustStore::new();
        let mut workers = Vec::with_capacity(config.cluster.num_workers as usize);

        for worker_id in 1..=config.cluster.num_workers {
            let key_name = worker_key_name(worker_id)?;
            let worker_keychain = keychain_dir.join(format!("worker-{worker_id}"));
            let signer = load_or_create_signer(&worker_keychain, key_name)
                .with_context(|| format!("加载Worker {worker_id} 的签名密钥失败"))?;
            trust_store.insert(signer.key_name().clone(), signer.public_key());

            let node = WorkerNode::start(transport.clone(), &node_config, worker_id, Arc::new(signer))
                .await
                .with_context(|| format!("启动Worker {worker_id} 失败"))?;
            workers.push(node);
        }

        let coordinator_key: Name = COORDINATOR_KEY_NAME.parse()?;
        let coordinator_signer = load_or_create_signer(keychain_dir.join("coordinator"), coordinator_key)
            .context("加载协调者签名密钥失败")?;

        let mut client = DispatchClient::new(transport.clone(), config.cluster.app_prefix.clone())
            .with_signer(Arc::new(coordinator_signer) as Arc<dyn Signer>);
        if config.coordinator.verify_responses {
            client = client.with_verifier(Arc::new(trust_store));
        }

        Ok(Self {
            config,
            transport,
            client: Arc::new(client),
            workers,
            shutdown,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn workers(&self) -> &[WorkerNode] {
        &self.workers
    }

    pub fn client(&self) -> Arc<DispatchClient> {
        Arc::clone(&self.client)
    }

    /// 就绪屏障，任何Worker耗尽重试次数都是致命错误
    pub async fn await_workers(&self) -> Result<LivenessReport> {
        let prober = LivenessProber::new(
            self.client(),
            LivenessConfig::from(&self.config.coordinator),
        );
        let report = prober
            .ensure_workers_available(self.config.cluster.num_workers, self.config.cluster.max_tries)
            .await
            .context("等待Worker就绪失败")?;
        info!(
            "全部Worker已就绪，用时 {:?}，失败探测 {} 次",
            report.elapsed,
            report.total_failed_attempts()
        );
        Ok(report)
    }

    /// 启动后的冒烟调用：add 3 5
    pub async fn smoke_test(&self) -> DispatchResult {
        let service = self.compute_service();
        let result = service.compute_add(3, 5, None).await;
        if result.success {
            info!("add(3, 5) 的结果: {}", result.result);
        } else {
            warn!("冒烟请求 add(3, 5) 失败: {}", result.result);
        }
        result
    }

    pub fn compute_service(&self) -> Arc<ComputeService> {
        Arc::new(ComputeService::from_config(
            self.client(),
            &self.config.coordinator,
            &self.config.api,
            self.shutdown.clone(),
        ))
    }

    pub fn router(&self) -> Router {
        create_app(self.compute_service())
    }

    /// 提供管理接口直到收到关闭信号
    pub async fn serve(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        if !self.config.api.enabled {
            info!("管理接口已禁用，等待关闭信号");
            let _ = shutdown_rx.recv().await;
            return self.stop().await;
        }

        let bind_address = &self.config.api.bind_address;
        let listener = TcpListener::bind(bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {bind_address}"))?;
        info!("API服务器启动在 http://{}", bind_address);

        let served = axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API服务器收到关闭信号");
            })
            .await;
        if let Err(e) = &served {
            error!("API服务器运行失败: {}", e);
        }

        self.stop().await?;
        served.context("API服务器运行失败")
    }

    async fn stop(&self) -> Result<()> {
        self.transport.stop().await.context("停止传输层失败")?;
        info!("计算集群已停止");
        Ok(())
    }
}
