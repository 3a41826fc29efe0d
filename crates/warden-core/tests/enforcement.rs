//! End-to-end enforcement scenarios
//!
//! These drive the full pipeline (raw event in, side effects out) against
//! the recording mocks.

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use warden_api::{Disposition, SessionStatus};
use warden_config::{
    load_config_with, Policy, ENV_KILL_SESSION, ENV_MAX_IDLE_TIMEOUT, ENV_MAX_WORKERS,
    ENV_NOTIFICATION_TARGET,
};
use warden_control_api::{MockController, MockNotifier, SessionController, TerminateOutcome};
use warden_core::{EnforcementError, Enforcer};
use warden_util::SessionId;

const TOPIC: &str = "arn:aws:sns:eu-west-1:123456789012:glue-alerts";
const SESSION: &str = "tenant-d4868e04-4a21-43c0-8fd3";

fn make_policy(extra: &[(&str, &str)]) -> Policy {
    let mut vars = vec![
        (ENV_MAX_WORKERS, "15"),
        (ENV_MAX_IDLE_TIMEOUT, "300"),
        (ENV_NOTIFICATION_TARGET, TOPIC),
    ];
    vars.extend_from_slice(extra);

    load_config_with(move |key: &str| {
        vars.iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
    .unwrap()
}

fn create_session_event(workers: Value, idle_timeout: Value) -> Value {
    json!({
        "version": "0",
        "id": "0c3f2d3e",
        "detail-type": "AWS API Call via CloudTrail",
        "source": "aws.glue",
        "account": "123456789012",
        "time": "2024-05-01T12:00:00Z",
        "region": "eu-west-1",
        "detail": {
            "eventVersion": "1.08",
            "userIdentity": {
                "type": "AssumedRole",
                "principalId": "AROAEXAMPLE:alice@example.com"
            },
            "eventSource": "glue.amazonaws.com",
            "eventName": "CreateSession",
            "awsRegion": "eu-west-1",
            "requestParameters": {
                "id": "debd3e86-1432-484b-b231-7e5e22d468b8",
                "numberOfWorkers": workers,
                "idleTimeout": idle_timeout,
                "workerType": "G.1X"
            },
            "responseElements": {
                "session": {
                    "id": SESSION,
                    "status": "PROVISIONING"
                }
            }
        }
    })
}

struct Harness {
    controller: Arc<MockController>,
    notifier: Arc<MockNotifier>,
    enforcer: Enforcer,
}

fn harness(policy: Policy, statuses: Vec<SessionStatus>) -> Harness {
    let controller = Arc::new(MockController::with_statuses(statuses));
    let notifier = Arc::new(MockNotifier::new());
    let enforcer = Enforcer::new(Arc::new(policy), controller.clone(), notifier.clone());
    Harness {
        controller,
        notifier,
        enforcer,
    }
}

#[tokio::test(start_paused = true)]
async fn test_worker_violation_terminated_and_notified() {
    let h = harness(
        make_policy(&[]),
        vec![SessionStatus::Provisioning, SessionStatus::Ready],
    );

    let outcome = h
        .enforcer
        .handle(&create_session_event(json!(20), json!(60)), Some(Duration::from_secs(900)))
        .await
        .unwrap();

    assert_eq!(outcome.disposition, Disposition::Enforced);
    assert_eq!(outcome.violations.rule_names(), vec!["workers"]);
    assert!(outcome.termination_succeeded);
    assert!(outcome.notification_sent);

    assert_eq!(h.controller.terminate_calls(), vec![SessionId::new(SESSION)]);
    let published = h.notifier.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].topic, TOPIC);
    assert!(published[0].body.contains("workers: 20 > 15"));
    assert!(published[0].body.contains("User: alice"));
}

#[tokio::test(start_paused = true)]
async fn test_compliant_session_has_no_side_effects() {
    let h = harness(make_policy(&[]), vec![SessionStatus::Ready]);

    let outcome = h
        .enforcer
        .handle(&create_session_event(json!(2), json!(60)), None)
        .await
        .unwrap();

    assert_eq!(outcome.disposition, Disposition::Compliant);
    assert_eq!(h.controller.status_calls(), 0);
    assert!(h.controller.terminate_calls().is_empty());
    assert_eq!(h.notifier.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_event_fails_before_any_call() {
    let h = harness(make_policy(&[]), vec![SessionStatus::Ready]);

    let mut raw = create_session_event(json!(20), json!(60));
    raw["detail"]["responseElements"]["session"]
        .as_object_mut()
        .unwrap()
        .remove("id");

    let err = h.enforcer.handle(&raw, None).await.unwrap_err();

    assert!(matches!(err, EnforcementError::MalformedEvent(_)));
    assert!(!err.is_retryable());
    assert_eq!(h.controller.status_calls(), 0);
    assert_eq!(h.notifier.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_never_ready_session_times_out() {
    let h = harness(make_policy(&[]), vec![SessionStatus::Provisioning]);

    let err = h
        .enforcer
        .handle(&create_session_event(json!(20), json!(60)), None)
        .await
        .unwrap_err();

    match &err {
        EnforcementError::SessionWaitTimeout {
            session_id,
            last_status,
            waited,
        } => {
            assert_eq!(session_id.as_str(), SESSION);
            assert_eq!(*last_status, Some(SessionStatus::Provisioning));
            assert!(*waited <= Duration::from_secs(120));
        }
        other => panic!("expected wait timeout, got {:?}", other),
    }
    assert!(err.is_retryable());
    assert!(h.controller.terminate_calls().is_empty());
    assert_eq!(h.notifier.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_redelivered_event_is_idempotent() {
    let h = harness(make_policy(&[]), vec![SessionStatus::Ready]);
    let raw = create_session_event(json!(20), json!(60));

    let first = h.enforcer.handle(&raw, None).await.unwrap();
    assert!(first.termination_succeeded);

    // The session now reports Terminated, so the second run skips it
    let second = h.enforcer.handle(&raw, None).await.unwrap();
    assert_eq!(
        second.disposition,
        Disposition::SkippedSessionGone {
            status: SessionStatus::Terminated
        }
    );
    assert_eq!(h.controller.terminate_calls().len(), 1);

    // A direct second termination is still a success
    let id = SessionId::new(SESSION);
    assert_eq!(
        h.controller.terminate(&id).await.unwrap(),
        TerminateOutcome::AlreadyTerminated
    );
}

#[tokio::test(start_paused = true)]
async fn test_partial_failure_is_aggregated() {
    let h = harness(make_policy(&[]), vec![SessionStatus::Ready]);
    *h.notifier.fail_publish.lock().unwrap() = true;

    let err = h
        .enforcer
        .handle(&create_session_event(json!(20), json!(60)), None)
        .await
        .unwrap_err();

    match err {
        EnforcementError::EnforcementFailed {
            termination,
            notification,
            ..
        } => {
            assert!(termination.is_none());
            assert!(notification.is_some());
        }
        other => panic!("expected aggregate failure, got {:?}", other),
    }
    assert_eq!(h.controller.terminate_calls().len(), 1);
    assert_eq!(h.notifier.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_notify_only_mode() {
    let h = harness(
        make_policy(&[(ENV_KILL_SESSION, "false")]),
        vec![SessionStatus::Provisioning],
    );

    let outcome = h
        .enforcer
        .handle(&create_session_event(json!("4"), json!(2880)), None)
        .await
        .unwrap();

    assert_eq!(outcome.violations.rule_names(), vec!["idle-timeout"]);
    assert!(!outcome.termination_attempted);
    assert!(outcome.notification_sent);
    assert_eq!(h.controller.status_calls(), 0);
    assert!(h.controller.terminate_calls().is_empty());

    let published = h.notifier.published();
    assert!(published[0].body.contains("idle-timeout: 2880 > 300"));
    assert!(published[0].body.ends_with("Terminated: no"));
}

#[tokio::test(start_paused = true)]
async fn test_session_failed_while_provisioning() {
    let h = harness(
        make_policy(&[]),
        vec![SessionStatus::Provisioning, SessionStatus::Failed],
    );

    let outcome = h
        .enforcer
        .handle(&create_session_event(json!(20), json!(60)), None)
        .await
        .unwrap();

    assert_eq!(
        outcome.disposition,
        Disposition::SkippedSessionGone {
            status: SessionStatus::Failed
        }
    );
    assert!(h.controller.terminate_calls().is_empty());
    assert_eq!(h.notifier.attempts(), 0);
}
