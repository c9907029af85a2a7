use std::path::Path;

use tracing::{debug, warn};

use crate::manifest::NodeManifest;

/// 某个Worker负责的一个 (块, 文件) 对
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shard {
    pub sequence: i64,
    pub file_path: String,
}

/// 由清单构建、之后只读的分片目录
#[derive(Debug, Clone, Default)]
pub struct ShardDirectory {
    manifest: NodeManifest,
}

impl ShardDirectory {
    pub fn new(manifest: NodeManifest) -> Self {
        Self { manifest }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// 加载清单；读取或解析失败时记录警告并返回空目录
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match NodeManifest::load(path) {
            Ok(manifest) => {
                debug!(
                    "已加载清单 {}（{} 个文件，{} 个块）",
                    path.display(),
                    manifest.file_count(),
                    manifest.chunk_count()
                );
                Self::new(manifest)
            }
            Err(e) => {
                warn!("加载清单失败，分片目录为空: {}", e);
                Self::empty()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.manifest.contents.is_empty()
    }

    pub fn manifest(&self) -> &NodeManifest {
        &self.manifest
    }

    /// 块的分区列表中 `worker_id` 每出现一次就产生一个分片，按清单顺序，重复项保留
    pub fn local_shards(&self, worker_id: u32) -> Vec<Shard> {
        let worker_id = i64::from(worker_id);
        let mut shards = Vec::new();
        for block in &self.manifest.contents {
            for chunk in &block.chunks {
                for &partition in &chunk.partitions {
                    if partition == worker_id {
                        shards.push(Shard {
                            sequence: chunk.sequence,
                            file_path: block.file_path.clone(),
                        });
                    }
                }
            }
        }
        shards
    }
}

impl From<NodeManifest> for ShardDirectory {
    fn from(manifest: NodeManifest) -> Self {
        Self::new(manifest)
    }
}
