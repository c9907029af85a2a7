use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info};

use flint_core::{
    protocol::{self, Operation},
    ContentType, Data, DataConfig, FlintResult, InterestArgs, InterestHandler, Name, Signer,
};

/// 计算请求处理器
///
/// 挂载在 `/<prefix>/add` 下，从请求名解析两个操作数并回复它们的和。
/// 解析失败时回复固定的错误文本；所有回复都使用Worker身份签名。
pub struct AddHandler {
    prefix: Name,
    signer: Arc<dyn Signer>,
    data_config: DataConfig,
}

impl AddHandler {
    pub fn new(app_prefix: &Name, signer: Arc<dyn Signer>, freshness: Duration) -> FlintResult<Self> {
        Ok(Self {
            prefix: protocol::operation_prefix(app_prefix, Operation::Add)?,
            signer,
            data_config: DataConfig {
                content_type: ContentType::Blob,
                freshness: Some(freshness),
            },
        })
    }

    pub fn prefix(&self) -> &Name {
        &self.prefix
    }

    /// 回复内容：和的十进制文本，或错误文本
    pub fn evaluate(&self, name: &Name) -> String {
        match protocol::decode_operands(name, &self.prefix) {
            Ok((x, y)) => Operation::Add.apply(x, y).to_string(),
            Err(e) => {
                debug!("拒绝请求 {}: {}", name, e);
                e.payload().to_string()
            }
        }
    }
}

#[async_trait]
impl InterestHandler for AddHandler {
    async fn on_interest(&self, args: InterestArgs) {
        let InterestArgs { interest, reply } = args;
        let name = interest.name().clone();
        info!("收到兴趣包 {}", name);

        let payload = self.evaluate(&name);
        let data = match Data::build(
            name.clone(),
            &self.data_config,
            payload.into_bytes(),
            Some(self.signer.as_ref()),
        ) {
            Ok(data) => data,
            Err(e) => {
                error!("签名 {} 的响应失败: {}", name, e);
                return;
            }
        };

        if let Err(e) = reply.reply(data) {
            error!("回复 {} 失败: {}", name, e);
        }
    }
}
