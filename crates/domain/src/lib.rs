pub mod errors;
pub mod manifest;
pub mod shard_directory;

pub use errors::{ManifestError, ManifestResult};
pub use manifest::{Chunk, FileBlock, NodeManifest};
pub use shard_directory::{Shard, ShardDirectory};
