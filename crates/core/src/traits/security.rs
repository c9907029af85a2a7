use std::fmt::Debug;

use crate::errors::FlintResult;
use crate::name::Name;

/// 签名身份，加载一次后只读共享
pub trait Signer: Send + Sync + Debug {
    /// 密钥名称，写入该签名者产生的每个签名
    fn key_name(&self) -> &Name;

    fn sign(&self, payload: &[u8]) -> FlintResult<Vec<u8>>;
}

pub trait Verifier: Send + Sync {
    /// 未知密钥一律校验失败
    fn verify(&self, key_name: &Name, payload: &[u8], signature: &[u8]) -> bool;
}
