use crate::common::{
    default_polling, not_found, progress_step, sample_report, server_client, ScriptedBackend,
};
use bounce_dashboard::config::PollingConfig;
use bounce_dashboard::dashboard::{Dashboard, TaskResult, UploadRequest, TASK_ERROR_MESSAGE};
use bounce_dashboard::types::UploadResponse;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Ingestion task tracking

fn spring_upload() -> UploadRequest {
    UploadRequest::new(
        "Acme",
        "Spring2024",
        "spring.csv",
        b"email,bounce_reason\na@x.com,Hard bounce\n".to_vec(),
    )
}

fn task_backend() -> ScriptedBackend {
    ScriptedBackend::new()
        .with_upload_response(Ok(UploadResponse {
            task_id: Some("task-1".to_string()),
            total_rows: Some(1),
            title: None,
        }))
        .with_progress(
            vec![
                progress_step(10, false),
                progress_step(60, false),
                progress_step(100, true),
            ],
            sample_report(),
        )
        .script("Acme-Spring2024", vec![not_found()])
}

#[tokio::test(start_paused = true)]
async fn test_track_task_writes_progress_until_complete() {
    let backend = Arc::new(task_backend());
    let dashboard = Dashboard::new(Arc::clone(&backend), default_polling());
    let ticket = dashboard.start_upload(spring_upload()).unwrap();

    let result = dashboard
        .track_task("task-1", Some(ticket.campaign_id.clone()))
        .await
        .unwrap();

    let report = match result {
        TaskResult::Completed(report) => report,
        other => panic!("expected completion, got {:?}", other),
    };
    assert_eq!(report.total_bounces(), 200);
    assert_eq!(backend.progress_calls(), 3);

    let campaign = dashboard.campaign(&ticket.campaign_id).unwrap();
    assert_eq!(campaign.progress, Some(100));
    assert_eq!(campaign.progress_message.as_deref(), Some("100% processed"));
    // Totals and the loading flag belong to the poller
    assert!(campaign.is_loading);
    assert_eq!(campaign.total, 0);
    ticket.poll.abort();
}

#[tokio::test(start_paused = true)]
async fn test_track_task_stops_when_campaign_settled() {
    let backend = Arc::new(
        task_backend().with_clients(vec![server_client("Acme", &[("Spring2024", 40)])]),
    );
    let dashboard = Dashboard::new(Arc::clone(&backend), default_polling());
    dashboard.bootstrap().await.unwrap();

    let result = dashboard
        .track_task("task-1", Some("Acme-Spring2024".into()))
        .await
        .unwrap();

    assert_eq!(result, TaskResult::Abandoned);
    assert_eq!(backend.progress_calls(), 1);
    assert_eq!(
        dashboard.campaign(&"Acme-Spring2024".into()).unwrap().progress,
        None
    );
}

#[tokio::test(start_paused = true)]
async fn test_track_task_without_campaign() {
    let backend = Arc::new(task_backend());
    let dashboard = Dashboard::new(Arc::clone(&backend), default_polling());

    let result = dashboard.track_task("task-1", None).await.unwrap();
    assert!(matches!(result, TaskResult::Completed(_)));
}

#[tokio::test(start_paused = true)]
async fn test_unknown_task_is_an_error() {
    let dashboard = Dashboard::new(ScriptedBackend::new(), default_polling());
    assert!(dashboard.track_task("missing", None).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_upload_starts_tracker_when_enabled() {
    let backend = Arc::new(task_backend());
    let polling = PollingConfig {
        track_progress: true,
        ..default_polling()
    };
    let dashboard = Dashboard::new(Arc::clone(&backend), polling);

    let ticket = dashboard.start_upload(spring_upload()).unwrap();
    // Progress is polled every second; three steps finish within 2.5s
    sleep(Duration::from_millis(2500)).await;

    let campaign = dashboard.campaign(&ticket.campaign_id).unwrap();
    assert_eq!(campaign.task_id.as_deref(), Some("task-1"));
    assert_eq!(campaign.progress, Some(100));
    assert_eq!(backend.progress_calls(), 3);
    ticket.poll.abort();
}

#[tokio::test(start_paused = true)]
async fn test_failed_tracking_marks_campaign() {
    // Upload answers with a task id, but the task has no progress to report
    let backend = Arc::new(
        ScriptedBackend::new()
            .with_upload_response(Ok(UploadResponse {
                task_id: Some("task-1".to_string()),
                total_rows: Some(1),
                title: None,
            }))
            .script("Acme-Spring2024", vec![not_found()]),
    );
    let polling = PollingConfig {
        track_progress: true,
        ..default_polling()
    };
    let dashboard = Dashboard::new(Arc::clone(&backend), polling);

    let ticket = dashboard.start_upload(spring_upload()).unwrap();
    sleep(Duration::from_millis(100)).await;

    let campaign = dashboard.campaign(&ticket.campaign_id).unwrap();
    assert!(campaign.is_loading);
    assert_eq!(campaign.progress_message.as_deref(), Some(TASK_ERROR_MESSAGE));
    assert_eq!(backend.progress_calls(), 1);
    ticket.poll.abort();
}

#[tokio::test(start_paused = true)]
async fn test_failed_tracking_leaves_settled_campaign_alone() {
    let backend = Arc::new(
        ScriptedBackend::new().with_clients(vec![server_client("Acme", &[("Spring2024", 40)])]),
    );
    let dashboard = Dashboard::new(Arc::clone(&backend), default_polling());
    dashboard.bootstrap().await.unwrap();

    let result = dashboard
        .track_task("task-1", Some("Acme-Spring2024".into()))
        .await;

    assert!(result.is_err());
    let campaign = dashboard.campaign(&"Acme-Spring2024".into()).unwrap();
    assert_eq!(campaign.progress_message, None);
}
