use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use flint_core::{AppConfig, FlintError};
use flint_domain::Shard;
use flint_infrastructure::security::KEY_FILE_NAME;
use flint_testing_utils::{interest_args, test_signer, ManifestBuilder, ScriptedTransport};
use flint_worker::{worker_key_name, WorkerNode, WorkerNodeConfig};
use tempfile::TempDir;

fn node_config(dir: &TempDir) -> WorkerNodeConfig {
    WorkerNodeConfig {
        app_prefix: "app".to_string(),
        manifest_path: dir.path().join("fs-manifest.json"),
        keychain_dir: dir.path().join("keys"),
        data_freshness: Duration::from_secs(5),
        ready_freshness: Duration::from_secs(1),
    }
}

#[test]
fn test_config_from_app_config() {
    let app = AppConfig::default();
    let config = WorkerNodeConfig::from(&app);
    assert_eq!(config.app_prefix, "ndn-compute");
    assert_eq!(config.manifest_path, PathBuf::from("/app/manifest/fs-manifest.json"));
    assert_eq!(config.data_freshness, Duration::from_secs(5));
    assert_eq!(config.ready_freshness, Duration::from_secs(1));
}

#[test]
fn test_worker_key_name() {
    assert_eq!(worker_key_name(3).unwrap().to_string(), "/local/worker/3/ecdsa-key");
}

#[tokio::test]
async fn test_start_attaches_and_registers_both_prefixes() {
    let dir = TempDir::new().unwrap();
    let transport = Arc::new(ScriptedTransport::new());
    let signer = Arc::new(test_signer("/local/worker/2/ecdsa-key"));

    let node = WorkerNode::start(transport.clone(), &node_config(&dir), 2, signer)
        .await
        .unwrap();

    let expected = vec!["/app/add".to_string(), "/app/worker/2/ready".to_string()];
    assert_eq!(transport.attached_prefixes(), expected);
    assert_eq!(transport.routes(), expected);
    assert_eq!(node.worker_id(), 2);
    assert_eq!(node.served_prefixes().len(), 2);
}

#[tokio::test]
async fn test_attached_handlers_answer() {
    let dir = TempDir::new().unwrap();
    let transport = Arc::new(ScriptedTransport::new());
    let signer = Arc::new(test_signer("/local/worker/1/ecdsa-key"));
    WorkerNode::start(transport.clone(), &node_config(&dir), 1, signer)
        .await
        .unwrap();

    let add = transport.handler_for("/app/add").expect("add handler attached");
    let (args, slot) = interest_args("/app/add/3/5", true);
    add.on_interest(args).await;
    assert_eq!(slot.take().unwrap().content_text(), "8");

    let ready = transport
        .handler_for("/app/worker/1/ready")
        .expect("ready responder attached");
    let (args, slot) = interest_args("/app/worker/1/ready", false);
    ready.on_interest(args).await;
    assert_eq!(slot.take().unwrap().content_text(), "ready");
}

#[tokio::test]
async fn test_route_failure_is_startup_error() {
    let dir = TempDir::new().unwrap();
    let transport = Arc::new(ScriptedTransport::new());
    transport.refuse_routes();
    let signer = Arc::new(test_signer("/local/worker/1/ecdsa-key"));

    let result = WorkerNode::start(transport, &node_config(&dir), 1, signer).await;
    assert!(matches!(result, Err(FlintError::Startup(_))));
}

#[tokio::test]
async fn test_invalid_prefix_is_startup_error() {
    let dir = TempDir::new().unwrap();
    let mut config = node_config(&dir);
    config.app_prefix = "has space".to_string();
    let signer = Arc::new(test_signer("/local/worker/1/ecdsa-key"));

    let result = WorkerNode::start(Arc::new(ScriptedTransport::new()), &config, 1, signer).await;
    assert!(matches!(result, Err(FlintError::Startup(_))));
}

#[tokio::test]
async fn test_loads_local_shards_from_manifest() {
    let dir = TempDir::new().unwrap();
    let config = node_config(&dir);
    ManifestBuilder::new()
        .file("a.bin")
        .chunk(0, &[1, 2])
        .chunk(1, &[2, 2])
        .file("b.bin")
        .chunk(0, &[3])
        .write_to(&config.manifest_path);
    let signer = Arc::new(test_signer("/local/worker/2/ecdsa-key"));

    let node = WorkerNode::start(Arc::new(ScriptedTransport::new()), &config, 2, signer)
        .await
        .unwrap();

    assert_eq!(
        node.local_shards(),
        vec![
            Shard {
                sequence: 0,
                file_path: "a.bin".to_string()
            },
            Shard {
                sequence: 1,
                file_path: "a.bin".to_string()
            },
            Shard {
                sequence: 1,
                file_path: "a.bin".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_missing_manifest_yields_no_shards() {
    let dir = TempDir::new().unwrap();
    let signer = Arc::new(test_signer("/local/worker/1/ecdsa-key"));

    let node = WorkerNode::start(Arc::new(ScriptedTransport::new()), &node_config(&dir), 1, signer)
        .await
        .unwrap();

    assert!(node.shards().is_empty());
    assert!(node.local_shards().is_empty());
}

#[tokio::test]
async fn test_start_with_keychain_persists_identity() {
    let dir = TempDir::new().unwrap();
    let config = node_config(&dir);

    WorkerNode::start_with_keychain(Arc::new(ScriptedTransport::new()), &config, 1)
        .await
        .unwrap();

    assert!(config.keychain_dir.join(KEY_FILE_NAME).exists());
}
