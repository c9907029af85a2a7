//! 按名称路由的传输引擎边界

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{FlintError, FlintResult};
use crate::models::{Data, Interest, RequestOutcome};
use crate::name::Name;

/// 以兴趣包的结果调用且仅调用一次
pub type ExpressCallback = Box<dyn FnOnce(RequestOutcome) + Send + 'static>;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn start(&self) -> FlintResult<()>;

    async fn stop(&self) -> FlintResult<()>;

    /// 将 `interest` 交给网络。返回 `Ok` 时 `callback` 恰好被调用一次，
    /// 返回 `Err` 时不会被调用。
    fn express(&self, interest: Interest, callback: ExpressCallback) -> FlintResult<()>;

    fn attach_handler(&self, prefix: Name, handler: Arc<dyn InterestHandler>) -> FlintResult<()>;

    async fn register_route(&self, prefix: &Name) -> FlintResult<()>;
}

#[async_trait]
pub trait InterestHandler: Send + Sync {
    async fn on_interest(&self, args: InterestArgs);
}

/// 一个入站兴趣包及回复它的能力
pub struct InterestArgs {
    pub interest: Interest,
    pub reply: Replier,
}

/// 传输层交给处理器的一次性回复能力
pub struct Replier {
    send: Box<dyn FnOnce(Data) -> FlintResult<()> + Send + 'static>,
}

impl Replier {
    pub fn new<F>(send: F) -> Self
    where
        F: FnOnce(Data) -> FlintResult<()> + Send + 'static,
    {
        Self {
            send: Box::new(send),
        }
    }

    /// 请求方已经不存在的回复器
    pub fn detached() -> Self {
        Self::new(|_| Err(FlintError::ReplyFailed("没有待回复的兴趣包".to_string())))
    }

    pub fn reply(self, data: Data) -> FlintResult<()> {
        (self.send)(data)
    }
}

impl fmt::Debug for Replier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Replier").finish_non_exhaustive()
    }
}
