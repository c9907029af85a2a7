use std::sync::Arc;
use std::time::Duration;

use flint_core::{CoordinatorConfig, FlintError};
use flint_dispatcher::{DispatchClient, LivenessConfig, LivenessProber};
use flint_testing_utils::{ScriptedReply, ScriptedTransport};
use tokio::time::Instant;

fn prober(transport: &Arc<ScriptedTransport>) -> LivenessProber {
    let client = Arc::new(DispatchClient::new(transport.clone(), "app"));
    LivenessProber::new(client, LivenessConfig::default())
}

#[test]
fn test_config_from_coordinator_section() {
    let config = LivenessConfig::from(&CoordinatorConfig::default());
    assert_eq!(config.probe_lifetime, Duration::from_secs(2));
    assert_eq!(config.probe_timeout, Duration::from_secs(3));
    assert_eq!(config.probe_interval, Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn test_all_ready_on_first_sweep() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on("/app/worker", [ScriptedReply::data("ready")]);

    let report = prober(&transport).ensure_workers_available(3, 10).await.unwrap();

    assert!(report.workers.iter().all(|w| w.ready));
    assert_eq!(report.total_failed_attempts(), 0);
    assert_eq!(
        transport.expressed_names(),
        vec![
            "/app/worker/1/ready",
            "/app/worker/2/ready",
            "/app/worker/3/ready",
        ]
    );
    // one interval after every readiness check
    assert!(report.elapsed >= Duration::from_millis(1500));
}

#[tokio::test(start_paused = true)]
async fn test_ready_workers_are_not_checked_again() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on(
        "/app/worker/1",
        [ScriptedReply::Timeout, ScriptedReply::data("ready")],
    );
    transport.on("/app/worker/2", [ScriptedReply::data("ready")]);

    let report = prober(&transport).ensure_workers_available(2, 10).await.unwrap();

    assert_eq!(
        transport.expressed_names(),
        vec![
            "/app/worker/1/ready",
            "/app/worker/2/ready",
            "/app/worker/1/ready",
        ]
    );
    assert_eq!(report.workers[0].attempts, 1);
    assert_eq!(report.workers[1].attempts, 0);
}

#[tokio::test(start_paused = true)]
async fn test_gives_up_when_budget_exhausted() {
    let transport = Arc::new(ScriptedTransport::new());
    // worker 1 is never routed; worker 2 answers
    transport.on("/app/worker/2", [ScriptedReply::data("ready")]);

    let result = prober(&transport).ensure_workers_available(2, 3).await;

    match result {
        Err(FlintError::WorkerUnavailable {
            worker_id,
            attempts,
        }) => {
            assert_eq!(worker_id, 1);
            assert_eq!(attempts, 3);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    let probes_of_first = transport
        .expressed_names()
        .iter()
        .filter(|n| n.as_str() == "/app/worker/1/ready")
        .count();
    assert_eq!(probes_of_first, 3);
    assert_eq!(transport.express_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_unanswered_readiness_check_ends_at_timeout() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on("/app/worker/1", [ScriptedReply::Hang]);

    let started = Instant::now();
    let result = prober(&transport).ensure_workers_available(1, 1).await;

    assert!(matches!(result, Err(FlintError::WorkerUnavailable { worker_id: 1, attempts: 1 })));
    // one readiness deadline plus one interval
    assert!(started.elapsed() >= Duration::from_millis(3500));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_zero_budget_rejected_without_probing() {
    let transport = Arc::new(ScriptedTransport::new());

    let result = prober(&transport).ensure_workers_available(2, 0).await;

    assert!(matches!(result, Err(FlintError::InvalidRetryBudget(0))));
    assert_eq!(transport.express_count(), 0);
}

#[tokio::test]
async fn test_no_workers_is_immediately_ready() {
    let transport = Arc::new(ScriptedTransport::new());

    let report = prober(&transport).ensure_workers_available(0, 5).await.unwrap();

    assert!(report.workers.is_empty());
    assert_eq!(transport.express_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_nacked_readiness_check_counts_as_failed_attempt() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.on(
        "/app/worker/1",
        [
            ScriptedReply::Nack(flint_core::NackReason::NoRoute),
            ScriptedReply::Nack(flint_core::NackReason::NoRoute),
            ScriptedReply::data("ready"),
        ],
    );

    let report = prober(&transport).ensure_workers_available(1, 5).await.unwrap();
    assert_eq!(report.workers[0].attempts, 2);
    assert!(report.workers[0].ready);
}
