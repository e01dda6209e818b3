//! Asynchronous analysis jobs with pollable progress.
//!
//! A job moves `pending -> analyzing -> completed | failed` and never leaves a
//! terminal state. Each job is driven by a single task; every write replaces
//! the whole record and only after checking the record is still in the state
//! that task expects, so a late progress update can never overwrite a
//! completion.

use crate::analyzers::{ScanProgress, StaticAnalyzer};
use crate::error::{AnalysisError, Result};
use crate::store::ResultStore;
use crate::types::{AnalysisRequest, AnalysisResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use uuid::Uuid;

pub type JobId = String;

/// Progress reported as soon as a job starts analyzing.
pub const INITIAL_PROGRESS: u8 = 10;
/// Highest progress a job reports before it completes.
pub const MAX_RUNNING_PROGRESS: u8 = 95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Analyzing,
    Completed,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Analyzing => write!(f, "analyzing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Analyzing { progress: u8 },
    Completed { result_id: u64 },
    Failed { error: String },
}

impl JobState {
    pub fn status(&self) -> JobStatus {
        match self {
            JobState::Pending => JobStatus::Pending,
            JobState::Analyzing { .. } => JobStatus::Analyzing,
            JobState::Completed { .. } => JobStatus::Completed,
            JobState::Failed { .. } => JobStatus::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed { .. } | JobState::Failed { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub state: JobState,
    pub started_at: DateTime<Utc>,
    /// Set when the job reaches a terminal state.
    pub finished_at: Option<DateTime<Utc>>,
}

/// What a poller sees for one job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatusView {
    Pending { job_id: JobId },
    Analyzing { job_id: JobId, progress: u8 },
    Completed { job_id: JobId, result: Box<AnalysisResult> },
    Failed { job_id: JobId, error: String },
}

impl JobStatusView {
    pub fn status(&self) -> JobStatus {
        match self {
            JobStatusView::Pending { .. } => JobStatus::Pending,
            JobStatusView::Analyzing { .. } => JobStatus::Analyzing,
            JobStatusView::Completed { .. } => JobStatus::Completed,
            JobStatusView::Failed { .. } => JobStatus::Failed,
        }
    }

    /// `None` for failed jobs, which report an error instead.
    pub fn progress(&self) -> Option<u8> {
        match self {
            JobStatusView::Pending { .. } => Some(0),
            JobStatusView::Analyzing { progress, .. } => Some(*progress),
            JobStatusView::Completed { .. } => Some(100),
            JobStatusView::Failed { .. } => None,
        }
    }

    pub fn job_id(&self) -> &str {
        match self {
            JobStatusView::Pending { job_id }
            | JobStatusView::Analyzing { job_id, .. }
            | JobStatusView::Completed { job_id, .. }
            | JobStatusView::Failed { job_id, .. } => job_id,
        }
    }
}

/// Runs analyses in the background and tracks them by job id.
///
/// Cloning is cheap; clones share the job table, analyzer and store.
#[derive(Clone)]
pub struct JobManager {
    jobs: Arc<RwLock<HashMap<JobId, Job>>>,
    analyzer: Arc<StaticAnalyzer>,
    store: ResultStore,
}

impl JobManager {
    pub fn new(analyzer: Arc<StaticAnalyzer>, store: ResultStore) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            analyzer,
            store,
        }
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn analyzer(&self) -> &StaticAnalyzer {
        &self.analyzer
    }

    /// Number of jobs currently in the table.
    pub fn job_count(&self) -> usize {
        self.jobs.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Create a job and schedule its analysis. Returns before any analysis runs.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, request: AnalysisRequest) -> JobId {
        let id = Uuid::new_v4().to_string();
        let job = Job {
            id: id.clone(),
            state: JobState::Pending,
            started_at: Utc::now(),
            finished_at: None,
        };
        self.jobs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.clone(), job);

        tracing::debug!("Job {} submitted", id);

        let manager = self.clone();
        let job_id = id.clone();
        tokio::spawn(async move { manager.run(job_id, request).await });

        id
    }

    /// Current view of a job.
    pub fn status(&self, id: &str) -> Result<JobStatusView> {
        let job = self
            .jobs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
            .ok_or_else(|| AnalysisError::JobNotFound(id.to_string()))?;

        let job_id = job.id;
        Ok(match job.state {
            JobState::Pending => JobStatusView::Pending { job_id },
            JobState::Analyzing { progress } => JobStatusView::Analyzing { job_id, progress },
            JobState::Completed { result_id } => {
                let result = self
                    .store
                    .get(result_id)
                    .ok_or(AnalysisError::ResultNotFound(result_id))?;
                JobStatusView::Completed {
                    job_id,
                    result: Box::new(result),
                }
            }
            JobState::Failed { error } => JobStatusView::Failed { job_id, error },
        })
    }

    /// Remove terminal jobs that finished at or before `cutoff`.
    pub fn purge_finished_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        let before = jobs.len();
        jobs.retain(|_, job| match job.finished_at {
            Some(finished) => finished > cutoff,
            None => true,
        });
        before - jobs.len()
    }

    /// Remove terminal jobs older than `ttl`. Running jobs are kept.
    pub fn purge_finished(&self, ttl: Duration) -> usize {
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => self.purge_finished_before(Utc::now() - ttl),
            Err(_) => 0,
        }
    }

    /// Periodically purge terminal jobs older than `ttl`.
    pub fn spawn_reaper(&self, interval: Duration, ttl: Duration) -> JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let removed = manager.purge_finished(ttl);
                if removed > 0 {
                    tracing::debug!("Evicted {} finished jobs", removed);
                }
            }
        })
    }

    async fn run(self, id: JobId, request: AnalysisRequest) {
        let started = self.replace_if(&id, JobStatus::Pending, |job| {
            Some(Job {
                state: JobState::Analyzing {
                    progress: INITIAL_PROGRESS,
                },
                ..job.clone()
            })
        });
        if !started {
            return;
        }
        tracing::debug!("Job {} analyzing", id);

        let scan_time = Utc::now();
        let clock = Instant::now();
        let analyzer = Arc::clone(&self.analyzer);
        let tracker = self.clone();
        let job_id = id.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            analyzer.analyze_with_progress(&request, |p| tracker.record_progress(&job_id, p))
        })
        .await;

        let state = match outcome {
            Ok(Ok(draft)) => {
                let duration_ms = clock.elapsed().as_millis() as u64;
                let result = self.store.save(draft.timed(scan_time, duration_ms));
                tracing::info!(
                    "Job {} completed: {} ({} findings, {} risk) in {}ms",
                    id,
                    result.contract_name(),
                    result.vulnerabilities().len(),
                    result.overall_risk(),
                    duration_ms
                );
                JobState::Completed {
                    result_id: result.id,
                }
            }
            Ok(Err(err)) => {
                tracing::warn!("Job {} failed: {}", id, err);
                JobState::Failed {
                    error: err.to_string(),
                }
            }
            Err(join_err) => {
                let error = if join_err.is_panic() {
                    format!("Analysis panicked: {}", panic_message(join_err.into_panic()))
                } else {
                    format!("Analysis task aborted: {}", join_err)
                };
                tracing::warn!("Job {} failed: {}", id, error);
                JobState::Failed { error }
            }
        };

        self.replace_if(&id, JobStatus::Analyzing, |job| {
            Some(Job {
                state,
                finished_at: Some(Utc::now()),
                ..job.clone()
            })
        });
    }

    fn record_progress(&self, id: &str, progress: ScanProgress) {
        let value = progress_percent(progress);
        self.replace_if(id, JobStatus::Analyzing, |job| match job.state {
            JobState::Analyzing { progress: current } if value > current => Some(Job {
                state: JobState::Analyzing { progress: value },
                ..job.clone()
            }),
            _ => None,
        });
    }

    /// Replace the record for `id` with `update(current)` if it is still in
    /// `expected` status. Returns whether a replacement happened.
    fn replace_if<F>(&self, id: &str, expected: JobStatus, update: F) -> bool
    where
        F: FnOnce(&Job) -> Option<Job>,
    {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        let Some(current) = jobs.get(id) else {
            return false;
        };
        if current.state.status() != expected {
            return false;
        }
        match update(current) {
            Some(next) => {
                jobs.insert(id.to_string(), next);
                true
            }
            None => false,
        }
    }
}

/// Map rule progress onto `INITIAL_PROGRESS..=MAX_RUNNING_PROGRESS`.
fn progress_percent(progress: ScanProgress) -> u8 {
    if progress.rules_total == 0 {
        return MAX_RUNNING_PROGRESS;
    }
    let span = (MAX_RUNNING_PROGRESS - INITIAL_PROGRESS) as usize;
    let done = progress.rules_done.min(progress.rules_total);
    INITIAL_PROGRESS + (span * done / progress.rules_total) as u8
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
