//! 请求（兴趣包）和响应（数据包）

use std::time::Duration;

use ring::digest::{digest, SHA256};

use crate::errors::FlintResult;
use crate::name::Name;
use crate::traits::{Signer, Verifier};

/// 携带应用参数的兴趣包末尾追加的名称组件前缀
pub const PARAMS_DIGEST_PREFIX: &str = "params-sha256=";

/// 未配置时兴趣包的默认生命周期
pub const DEFAULT_INTEREST_LIFETIME: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterestConfig {
    pub must_be_fresh: bool,
    pub lifetime: Duration,
    /// 缺省时随机生成
    pub nonce: Option<u32>,
}

impl Default for InterestConfig {
    fn default() -> Self {
        Self {
            must_be_fresh: false,
            lifetime: DEFAULT_INTEREST_LIFETIME,
            nonce: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    pub key_name: Name,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Interest {
    name: Name,
    must_be_fresh: bool,
    lifetime: Duration,
    nonce: u32,
    app_parameters: Option<Vec<u8>>,
    signature: Option<SignatureInfo>,
}

impl Interest {
    /// 构建兴趣包
    ///
    /// 附带应用参数时（提供签名者意味着附带空参数块）兴趣包会被封装：
    /// 对名称和参数签名，并在末尾追加覆盖参数与签名的 `params-sha256=<hex>` 组件。
    /// 接收方解析名称前先去掉该组件。
    pub fn build(
        name: Name,
        config: &InterestConfig,
        app_parameters: Option<Vec<u8>>,
        signer: Option<&dyn Signer>,
    ) -> FlintResult<Self> {
        let app_parameters = match (app_parameters, signer) {
            (None, Some(_)) => Some(Vec::new()),
            (params, _) => params,
        };

        let (name, signature) = match &app_parameters {
            None => (name, None),
            Some(params) => {
                let signature = match signer {
                    Some(signer) => {
                        let mut payload = name.to_string().into_bytes();
                        payload.push(0);
                        payload.extend_from_slice(params);
                        Some(SignatureInfo {
                            key_name: signer.key_name().clone(),
                            value: signer.sign(&payload)?,
                        })
                    }
                    None => None,
                };

                let mut covered = params.clone();
                if let Some(sig) = &signature {
                    covered.extend_from_slice(&sig.value);
                }
                let params_digest = hex::encode(digest(&SHA256, &covered));
                let sealed = name.append(format!("{PARAMS_DIGEST_PREFIX}{params_digest}"))?;
                (sealed, signature)
            }
        };

        Ok(Self {
            name,
            must_be_fresh: config.must_be_fresh,
            lifetime: config.lifetime,
            nonce: config.nonce.unwrap_or_else(rand::random),
            app_parameters,
            signature,
        })
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn must_be_fresh(&self) -> bool {
        self.must_be_fresh
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn nonce(&self) -> u32 {
        self.nonce
    }

    pub fn app_parameters(&self) -> Option<&[u8]> {
        self.app_parameters.as_deref()
    }

    pub fn signature(&self) -> Option<&SignatureInfo> {
        self.signature.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    #[default]
    Blob,
}

#[derive(Debug, Clone, Default)]
pub struct DataConfig {
    pub content_type: ContentType,
    pub freshness: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct Data {
    name: Name,
    content: Vec<u8>,
    content_type: ContentType,
    freshness: Option<Duration>,
    signature: Option<SignatureInfo>,
}

impl Data {
    pub fn build(
        name: Name,
        config: &DataConfig,
        content: Vec<u8>,
        signer: Option<&dyn Signer>,
    ) -> FlintResult<Self> {
        let signature = match signer {
            Some(signer) => Some(SignatureInfo {
                key_name: signer.key_name().clone(),
                value: signer.sign(&signed_portion(&name, &content))?,
            }),
            None => None,
        };

        Ok(Self {
            name,
            content,
            content_type: config.content_type,
            freshness: config.freshness,
            signature,
        })
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn content_text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn freshness(&self) -> Option<Duration> {
        self.freshness
    }

    pub fn signature(&self) -> Option<&SignatureInfo> {
        self.signature.as_ref()
    }

    /// 未签名的数据包一律校验失败
    pub fn verify_with(&self, verifier: &dyn Verifier) -> bool {
        match &self.signature {
            Some(sig) => verifier.verify(
                &sig.key_name,
                &signed_portion(&self.name, &self.content),
                &sig.value,
            ),
            None => false,
        }
    }
}

fn signed_portion(name: &Name, content: &[u8]) -> Vec<u8> {
    let mut payload = name.to_string().into_bytes();
    payload.push(0);
    payload.extend_from_slice(content);
    payload
}
