use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use flint_core::{protocol, AppConfig, FlintError, FlintResult, InterestHandler, Name, Signer, Transport};
use flint_domain::{Shard, ShardDirectory};
use flint_infrastructure::load_or_create_signer;

use super::{AddHandler, ReadyResponder};

/// Worker节点配置
#[derive(Debug, Clone)]
pub struct WorkerNodeConfig {
    pub app_prefix: String,
    pub manifest_path: PathBuf,
    pub keychain_dir: PathBuf,
    pub data_freshness: Duration,
    pub ready_freshness: Duration,
}

impl From<&AppConfig> for WorkerNodeConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            app_prefix: config.cluster.app_prefix.clone(),
            manifest_path: PathBuf::from(&config.worker.manifest_path),
            keychain_dir: PathBuf::from(&config.worker.keychain_dir),
            data_freshness: config.worker.data_freshness(),
            ready_freshness: config.worker.ready_freshness(),
        }
    }
}

/// 签名身份的密钥名称
pub fn worker_key_name(worker_id: u32) -> FlintResult<Name> {
    format!("/local/worker/{worker_id}/ecdsa-key").parse()
}

/// 运行中的Worker节点
///
/// 在传输层上挂载计算处理器和就绪应答器并注册路由，持有本地分片目录。
pub struct WorkerNode {
    worker_id: u32,
    served_prefixes: Vec<Name>,
    shards: ShardDirectory,
}

impl WorkerNode {
    /// 使用已有的签名身份启动。传输层必须已经启动。
    pub async fn start(
        transport: Arc<dyn Transport>,
        config: &WorkerNodeConfig,
        worker_id: u32,
        signer: Arc<dyn Signer>,
    ) -> FlintResult<Self> {
        info!("启动Worker {}", worker_id);

        let app_prefix = protocol::app_prefix(&config.app_prefix)
            .map_err(|e| FlintError::Startup(format!("应用前缀无效: {e}")))?;

        let add_handler = AddHandler::new(&app_prefix, signer, config.data_freshness)
            .map_err(|e| FlintError::Startup(format!("创建计算处理器失败: {e}")))?;
        let add_prefix = add_handler.prefix().clone();
        let ready_prefix = protocol::readiness_name(&app_prefix, worker_id)
            .map_err(|e| FlintError::Startup(format!("就绪前缀无效: {e}")))?;

        let add_handler: Arc<dyn InterestHandler> = Arc::new(add_handler);
        let ready_responder: Arc<dyn InterestHandler> =
            Arc::new(ReadyResponder::new(config.ready_freshness));
        let handlers = [(add_prefix, add_handler), (ready_prefix, ready_responder)];

        let mut served_prefixes = Vec::with_capacity(handlers.len());
        for (prefix, handler) in handlers {
            transport
                .attach_handler(prefix.clone(), handler)
                .map_err(|e| {
                    error!("Worker {} 挂载 {} 失败: {}", worker_id, prefix, e);
                    FlintError::Startup(format!("挂载处理器失败: {e}"))
                })?;
            transport.register_route(&prefix).await.map_err(|e| {
                error!("Worker {} 注册 {} 失败: {}", worker_id, prefix, e);
                FlintError::Startup(format!("注册路由失败: {e}"))
            })?;
            info!("Worker {} 开始服务 {}", worker_id, prefix);
            served_prefixes.push(prefix);
        }

        let shards = ShardDirectory::load_or_empty(&config.manifest_path);
        let local = shards.local_shards(worker_id);
        info!("Worker {} 持有 {} 个本地分片", worker_id, local.len());

        Ok(Self {
            worker_id,
            served_prefixes,
            shards,
        })
    }

    /// 从 `<keychain_dir>` 加载或生成签名身份后启动
    pub async fn start_with_keychain(
        transport: Arc<dyn Transport>,
        config: &WorkerNodeConfig,
        worker_id: u32,
    ) -> FlintResult<Self> {
        let key_name = worker_key_name(worker_id)?;
        let signer = load_or_create_signer(&config.keychain_dir, key_name)?;
        Self::start(transport, config, worker_id, Arc::new(signer)).await
    }

    pub fn worker_id(&self) -> u32 {
        self.worker_id
    }

    pub fn served_prefixes(&self) -> &[Name] {
        &self.served_prefixes
    }

    pub fn shards(&self) -> &ShardDirectory {
        &self.shards
    }

    pub fn local_shards(&self) -> Vec<Shard> {
        self.shards.local_shards(self.worker_id)
    }
}
