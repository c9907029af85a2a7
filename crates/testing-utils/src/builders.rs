//! Test data builders for creating manifests.

use std::path::Path;

use flint_domain::{Chunk, FileBlock, NodeManifest};

/// Builder for creating test NodeManifest entities
#[derive(Debug, Default)]
pub struct ManifestBuilder {
    blocks: Vec<FileBlock>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new file block; subsequent chunks are added to it.
    pub fn file(mut self, file_path: &str) -> Self {
        self.blocks.push(FileBlock {
            file_path: file_path.to_string(),
            chunks: Vec::new(),
        });
        self
    }

    pub fn chunk(mut self, sequence: i64, partitions: &[i64]) -> Self {
        let block = self
            .blocks
            .last_mut()
            .expect("call file() before chunk()");
        block.chunks.push(Chunk {
            sequence,
            size: None,
            partitions: partitions.to_vec(),
        });
        self
    }

    pub fn build(self) -> NodeManifest {
        NodeManifest::new(self.blocks)
    }

    /// Writes the manifest as JSON to `path`.
    pub fn write_to(self, path: impl AsRef<Path>) -> NodeManifest {
        let manifest = self.build();
        let json = manifest.to_json().expect("manifest serializes");
        std::fs::write(path, json).expect("manifest written");
        manifest
    }
}
