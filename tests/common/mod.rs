//! Common Test Utilities
//!
//! Report builders, a scripted in-process backend and polling settings shared
//! by the unit and integration suites.

#![allow(dead_code)]

use async_trait::async_trait;
use bounce_dashboard::api::{BounceBackend, CsvUpload, ReportLookup};
use bounce_dashboard::config::PollingConfig;
use bounce_dashboard::errors::{ApiError, ApiResult};
use bounce_dashboard::types::{
    BreakdownEntry, Campaign, CampaignId, Client, GlobalInfo, Report, Stats, TaskProgress,
    UploadResponse,
};
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Report whose only populated figure is the bounce total
pub fn report_with_total(total: u64) -> Report {
    Report {
        global_info: GlobalInfo {
            total_bounces: total,
            oldest_record: None,
        },
        ..Default::default()
    }
}

/// Hard/soft bounces across Gmail and Yahoo, 200 bounces in all
pub fn sample_report() -> Report {
    let mut report = report_with_total(200);
    report.title = Some("Spring 2024".to_string());

    let pivot = [
        ("Hard bounce", "Gmail", 100),
        ("Hard bounce", "Yahoo", 40),
        ("Soft bounce", "Gmail", 6),
        ("Soft bounce", "Yahoo", 54),
    ];
    for (reason, source, count) in pivot {
        report
            .pivot_table
            .entry(reason.to_string())
            .or_default()
            .insert(source.to_string(), count);
        *report
            .reason_stats
            .counts
            .entry(reason.to_string())
            .or_default() += count;
        *report
            .source_stats
            .counts
            .entry(source.to_string())
            .or_default() += count;
        report
            .reason_breakdown
            .entry(reason.to_string())
            .or_insert_with(BreakdownEntry::default)
            .counts
            .insert(source.to_string(), count);
        report
            .source_breakdown
            .entry(source.to_string())
            .or_insert_with(BreakdownEntry::default)
            .counts
            .insert(reason.to_string(), count);
    }
    report.reason_stats = with_percentages(report.reason_stats);
    report.source_stats = with_percentages(report.source_stats);
    report
}

fn with_percentages(mut stats: Stats) -> Stats {
    let total = stats.total() as f64;
    stats.percentages = stats
        .counts
        .iter()
        .map(|(k, v)| (k.clone(), *v as f64 / total * 100.0))
        .collect();
    stats
}

pub fn server_client(name: &str, campaigns: &[(&str, u64)]) -> Client {
    let now = Utc::now();
    let mut client = Client::new(name, now);
    for (campaign_name, total) in campaigns {
        let mut campaign =
            Campaign::pending(CampaignId::derive(name, campaign_name), campaign_name, now);
        campaign.total = *total;
        campaign.is_loading = false;
        client.campaigns.push(campaign);
    }
    client.refresh_totals();
    client
}

/// Original fixed cadence with no budget, as the poll tests assert exact gaps
pub fn default_polling() -> PollingConfig {
    PollingConfig {
        track_progress: false,
        ..PollingConfig::unbounded_fixed()
    }
}

/// Millisecond delays for tests that run on the real clock
pub fn fast_polling() -> PollingConfig {
    PollingConfig {
        not_found_delay_ms: 20,
        processing_delay_ms: 10,
        progress_interval_ms: 10,
        backoff_multiplier: 1.0,
        max_backoff_seconds: 1,
        max_attempts: 200,
        deadline_seconds: 30,
        track_progress: false,
    }
}

#[derive(Debug, Clone)]
pub struct ScriptedReport {
    pub delay: Duration,
    pub response: ApiResult<ReportLookup>,
}

pub fn found(total: u64) -> ScriptedReport {
    ScriptedReport {
        delay: Duration::ZERO,
        response: Ok(ReportLookup::Found(report_with_total(total))),
    }
}

pub fn not_found() -> ScriptedReport {
    ScriptedReport {
        delay: Duration::ZERO,
        response: Ok(ReportLookup::NotFound),
    }
}

pub fn status(code: u16) -> ScriptedReport {
    ScriptedReport {
        delay: Duration::ZERO,
        response: Err(ApiError::UnexpectedStatus {
            endpoint: "/api/report".to_string(),
            status: code,
        }),
    }
}

impl ScriptedReport {
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// In-process backend replaying scripted answers
///
/// Each campaign's report answers are consumed in order; the last one repeats.
/// Campaigns with no script answer 404.
#[derive(Default)]
pub struct ScriptedBackend {
    clients: Mutex<Vec<Client>>,
    list_delay: Mutex<Duration>,
    reports: Mutex<HashMap<CampaignId, VecDeque<ScriptedReport>>>,
    report_calls: Mutex<Vec<(CampaignId, Instant)>>,
    uploads: Mutex<Vec<CsvUpload>>,
    upload_response: Mutex<Option<ApiResult<UploadResponse>>>,
    progress: Mutex<VecDeque<TaskProgress>>,
    progress_calls: Mutex<u32>,
    task_report: Mutex<Option<Report>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clients(self, clients: Vec<Client>) -> Self {
        *self.clients.lock().unwrap() = clients;
        self
    }

    /// Delay every `list_campaigns` answer
    pub fn with_list_delay(self, delay: Duration) -> Self {
        *self.list_delay.lock().unwrap() = delay;
        self
    }

    pub fn script(self, campaign_id: &str, answers: Vec<ScriptedReport>) -> Self {
        self.reports
            .lock()
            .unwrap()
            .insert(CampaignId::from(campaign_id), answers.into());
        self
    }

    pub fn with_upload_response(self, response: ApiResult<UploadResponse>) -> Self {
        *self.upload_response.lock().unwrap() = Some(response);
        self
    }

    pub fn with_progress(self, steps: Vec<TaskProgress>, report: Report) -> Self {
        *self.progress.lock().unwrap() = steps.into();
        *self.task_report.lock().unwrap() = Some(report);
        self
    }

    /// Instants at which `fetch_report` was called for one campaign
    pub fn report_calls(&self, campaign_id: &str) -> Vec<Instant> {
        self.report_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id.as_str() == campaign_id)
            .map(|(_, at)| *at)
            .collect()
    }

    pub fn total_report_calls(&self) -> usize {
        self.report_calls.lock().unwrap().len()
    }

    pub fn uploads(&self) -> Vec<CsvUpload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn progress_calls(&self) -> u32 {
        *self.progress_calls.lock().unwrap()
    }

    fn next_report(&self, campaign_id: &CampaignId) -> ScriptedReport {
        let mut reports = self.reports.lock().unwrap();
        match reports.get_mut(campaign_id) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or_else(not_found),
            None => not_found(),
        }
    }
}

#[async_trait]
impl BounceBackend for ScriptedBackend {
    async fn list_campaigns(&self) -> ApiResult<Vec<Client>> {
        let delay = *self.list_delay.lock().unwrap();
        if !delay.is_zero() {
            sleep(delay).await;
        }
        Ok(self.clients.lock().unwrap().clone())
    }

    async fn fetch_report(&self, campaign_id: &CampaignId) -> ApiResult<ReportLookup> {
        self.report_calls
            .lock()
            .unwrap()
            .push((campaign_id.clone(), Instant::now()));
        let answer = self.next_report(campaign_id);
        if !answer.delay.is_zero() {
            sleep(answer.delay).await;
        }
        answer.response
    }

    async fn campaign_exists(&self, campaign_id: &CampaignId) -> ApiResult<bool> {
        Ok(self.reports.lock().unwrap().contains_key(campaign_id))
    }

    async fn upload_csv(&self, upload: CsvUpload) -> ApiResult<UploadResponse> {
        self.uploads.lock().unwrap().push(upload);
        self.upload_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(UploadResponse::default()))
    }

    async fn task_progress(&self, _task_id: &str) -> ApiResult<TaskProgress> {
        *self.progress_calls.lock().unwrap() += 1;
        let mut steps = self.progress.lock().unwrap();
        let step = if steps.len() > 1 {
            steps.pop_front()
        } else {
            steps.front().cloned()
        };
        step.ok_or_else(|| ApiError::UnexpectedStatus {
            endpoint: "/api/progress".to_string(),
            status: 404,
        })
    }

    async fn task_result(&self, _task_id: &str) -> ApiResult<Report> {
        self.task_report
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ApiError::UnexpectedStatus {
                endpoint: "/api/analyze".to_string(),
                status: 404,
            })
    }
}

pub fn progress_step(progress: u8, is_complete: bool) -> TaskProgress {
    TaskProgress {
        progress,
        message: format!("{}% processed", progress),
        is_complete,
        ..Default::default()
    }
}
