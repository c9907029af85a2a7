use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("读取清单文件失败: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析清单文件失败: {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type ManifestResult<T> = Result<T, ManifestError>;
