use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use flint_core::{protocol, ContentType, Data, DataConfig, InterestArgs, InterestHandler};

/// 就绪探测应答器，总是回复未签名的 `"ready"`
pub struct ReadyResponder {
    data_config: DataConfig,
}

impl ReadyResponder {
    pub fn new(freshness: Duration) -> Self {
        Self {
            data_config: DataConfig {
                content_type: ContentType::Blob,
                freshness: Some(freshness),
            },
        }
    }
}

#[async_trait]
impl InterestHandler for ReadyResponder {
    async fn on_interest(&self, args: InterestArgs) {
        let InterestArgs { interest, reply } = args;
        let name = interest.name().clone();
        debug!("收到就绪探测 {}", name);

        let data = match Data::build(
            name.clone(),
            &self.data_config,
            protocol::READY_PAYLOAD.as_bytes().to_vec(),
            None,
        ) {
            Ok(data) => data,
            Err(e) => {
                error!("构建就绪响应失败 {}: {}", name, e);
                return;
            }
        };

        if let Err(e) = reply.reply(data) {
            error!("回复 {} 失败: {}", name, e);
        }
    }
}
