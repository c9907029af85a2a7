use std::collections::HashMap;

use flint_core::{Name, Verifier};
use ring::signature::{UnparsedPublicKey, ECDSA_P256_SHA256_ASN1};

/// 受信任的公钥集合，按密钥名称索引
#[derive(Debug, Clone, Default)]
pub struct TrustStore {
    keys: HashMap<Name, Vec<u8>>,
}

impl TrustStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `public_key` 是未压缩的 P-256 公钥点，即
    /// [`EcdsaSigner::public_key`](super::EcdsaSigner::public_key) 的返回值
    pub fn insert(&mut self, key_name: Name, public_key: Vec<u8>) {
        self.keys.insert(key_name, public_key);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Verifier for TrustStore {
    fn verify(&self, key_name: &Name, payload: &[u8], signature: &[u8]) -> bool {
        match self.keys.get(key_name) {
            Some(public_key) => UnparsedPublicKey::new(&ECDSA_P256_SHA256_ASN1, public_key)
                .verify(payload, signature)
                .is_ok(),
            None => false,
        }
    }
}
