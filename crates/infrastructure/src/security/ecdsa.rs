//! ECDSA P-256 签名身份
//!
//! 私钥以 SEC1 PEM（`EC PRIVATE KEY`）格式保存在 `<keychain_dir>/ecdsa.key`；
//! 读取时同时接受 PKCS#8（`PRIVATE KEY`）格式。

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

use flint_core::{FlintError, FlintResult, Name, Signer};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::{DecodePrivateKey, LineEnding};
use p256::SecretKey;
use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_ASN1_SIGNING};
use tracing::info;

pub const KEY_FILE_NAME: &str = "ecdsa.key";

pub struct EcdsaSigner {
    key_name: Name,
    key_pair: EcdsaKeyPair,
    rng: SystemRandom,
}

impl EcdsaSigner {
    pub fn from_secret_key(key_name: Name, secret: &SecretKey) -> FlintResult<Self> {
        let rng = SystemRandom::new();
        let public_key = secret.public_key().to_encoded_point(false);
        let key_pair = EcdsaKeyPair::from_private_key_and_public_key(
            &ECDSA_P256_SHA256_ASN1_SIGNING,
            secret.to_bytes().as_slice(),
            public_key.as_bytes(),
            &rng,
        )
        .map_err(|e| FlintError::Credential(format!("解析ECDSA密钥失败: {e}")))?;
        Ok(Self {
            key_name,
            key_pair,
            rng,
        })
    }

    /// 解析 SEC1 或 PKCS#8 PEM 私钥
    pub fn from_pem(key_name: Name, pem: &str) -> FlintResult<Self> {
        let secret = SecretKey::from_sec1_pem(pem)
            .or_else(|_| SecretKey::from_pkcs8_pem(pem))
            .map_err(|e| FlintError::Credential(format!("密钥文件中的PEM无效: {e}")))?;
        Self::from_secret_key(key_name, &secret)
    }

    /// 生成新密钥，同时返回私钥以便持久化
    pub fn generate(key_name: Name) -> FlintResult<(Self, SecretKey)> {
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &SystemRandom::new())
            .map_err(|_| FlintError::Credential("生成ECDSA密钥失败".to_string()))?;
        let secret = SecretKey::from_pkcs8_der(pkcs8.as_ref())
            .map_err(|e| FlintError::Credential(format!("生成ECDSA密钥失败: {e}")))?;
        let signer = Self::from_secret_key(key_name, &secret)?;
        Ok((signer, secret))
    }

    /// 未压缩的 P-256 公钥点
    pub fn public_key(&self) -> Vec<u8> {
        self.key_pair.public_key().as_ref().to_vec()
    }
}

impl Signer for EcdsaSigner {
    fn key_name(&self) -> &Name {
        &self.key_name
    }

    fn sign(&self, payload: &[u8]) -> FlintResult<Vec<u8>> {
        self.key_pair
            .sign(&self.rng, payload)
            .map(|signature| signature.as_ref().to_vec())
            .map_err(|_| FlintError::Signing(format!("签名失败: {}", self.key_name)))
    }
}

impl fmt::Debug for EcdsaSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdsaSigner")
            .field("key_name", &self.key_name)
            .finish_non_exhaustive()
    }
}

/// 加载 `<keychain_dir>/ecdsa.key`，文件不存在时生成并保存新密钥
pub fn load_or_create_signer(keychain_dir: impl AsRef<Path>, key_name: Name) -> FlintResult<EcdsaSigner> {
    let keychain_dir = keychain_dir.as_ref();
    let key_path = keychain_dir.join(KEY_FILE_NAME);

    if key_path.exists() {
        let pem = fs::read_to_string(&key_path).map_err(|e| {
            FlintError::Credential(format!("读取ECDSA密钥失败: {}: {e}", key_path.display()))
        })?;
        return EcdsaSigner::from_pem(key_name, &pem);
    }

    let (signer, secret) = EcdsaSigner::generate(key_name)?;
    let pem = secret
        .to_sec1_pem(LineEnding::LF)
        .map_err(|e| FlintError::Credential(format!("编码ECDSA密钥失败: {e}")))?;
    create_private_dir(keychain_dir)?;
    write_private_file(&key_path, pem.as_bytes()).map_err(|e| {
        FlintError::Credential(format!("保存ECDSA密钥失败: {}: {e}", key_path.display()))
    })?;
    info!("已生成新的ECDSA密钥: {}", key_path.display());

    Ok(signer)
}

fn create_private_dir(dir: &Path) -> FlintResult<()> {
    fs::create_dir_all(dir).map_err(|e| {
        FlintError::Credential(format!("创建密钥目录失败: {}: {e}", dir.display()))
    })?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700)).map_err(|e| {
            FlintError::Credential(format!("设置密钥目录权限失败: {}: {e}", dir.display()))
        })?;
    }
    Ok(())
}

fn write_private_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}
