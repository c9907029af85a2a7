use thiserror::Error;

/// 系统错误类型定义
#[derive(Debug, Error)]
pub enum FlintError {
    #[error("无效的名称: {name} - {reason}")]
    InvalidName { name: String, reason: String },

    #[error("签名错误: {0}")]
    Signing(String),

    #[error("凭据错误: {0}")]
    Credential(String),

    #[error("传输层未启动")]
    TransportNotStarted,

    #[error("传输层错误: {0}")]
    Transport(String),

    #[error("处理器挂载失败: {prefix} - {reason}")]
    HandlerAttach { prefix: String, reason: String },

    #[error("路由注册失败: {prefix} - {reason}")]
    RouteRegistration { prefix: String, reason: String },

    #[error("回复发送失败: {0}")]
    ReplyFailed(String),

    #[error("Worker {worker_id} 在 {attempts} 次尝试后仍未响应")]
    WorkerUnavailable { worker_id: u32, attempts: u32 },

    #[error("无效的重试次数: {0}，必须大于0")]
    InvalidRetryBudget(u32),

    #[error("启动失败: {0}")]
    Startup(String),
}

impl FlintError {
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// 统一的Result类型
pub type FlintResult<T> = std::result::Result<T, FlintError>;
