//! 分片清单
//!
//! 清单文件是一个 JSON 数组，每个元素描述一个文件如何被切分为块，以及每个块被分配到哪些分区：
//!
//! ```json
//! [{"filePath": "data.bin", "chunks": [{"sequence": 0, "size": 64, "partitions": [1, 2]}]}]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ManifestError, ManifestResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub sequence: i64,
    /// 块大小，由清单生成器写入，路由不使用
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    /// 分区（Worker）ID 列表，可能包含重复项
    pub partitions: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileBlock {
    pub file_path: String,
    pub chunks: Vec<Chunk>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeManifest {
    pub contents: Vec<FileBlock>,
}

impl NodeManifest {
    pub fn new(contents: Vec<FileBlock>) -> Self {
        Self { contents }
    }

    pub fn load(path: impl AsRef<Path>) -> ManifestResult<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let contents: Vec<FileBlock> =
            serde_json::from_slice(&data).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self { contents })
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            contents: serde_json::from_str(json)?,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.contents)
    }

    pub fn file_count(&self) -> usize {
        self.contents.len()
    }

    pub fn chunk_count(&self) -> usize {
        self.contents.iter().map(|block| block.chunks.len()).sum()
    }
}
