use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use crate::downloader::job::{JobContext, JobOutcome};
use crate::downloader::DownloadJob;
use crate::errors::{AppError, Result};

pub const DEFAULT_MAX_CONCURRENT: usize = 2;

/// Counting gate bounding how many jobs run at once. Waiters are not
/// bounded.
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    limit: usize,
    running: Arc<AtomicUsize>,
}

/// Held while a job runs; releases the slot on drop.
pub struct Admission {
    _permit: OwnedSemaphorePermit,
    running: Arc<AtomicUsize>,
}

impl Drop for Admission {
    fn drop(&mut self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AdmissionGate {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
            running: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub async fn admit(&self) -> Result<Admission> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AppError::Unknown("Admission gate closed".to_string()))?;
        self.running.fetch_add(1, Ordering::SeqCst);
        Ok(Admission {
            _permit: permit,
            running: self.running.clone(),
        })
    }

    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// Handle to a submitted job. Dropping it does not cancel the job.
pub struct JobHandle {
    job_id: String,
    handle: JoinHandle<JobOutcome>,
}

impl JobHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub async fn wait(self) -> JobOutcome {
        self.handle.await.unwrap_or(JobOutcome::Failed)
    }
}

/// Fire-and-forget job dispatcher.
///
/// `submit` never blocks and never rejects: jobs queue on the admission
/// gate without limit, trading memory for never turning a user away.
#[derive(Clone)]
pub struct DownloadManager {
    context: Arc<JobContext>,
    gate: Arc<AdmissionGate>,
    in_flight: Arc<AtomicUsize>,
}

impl DownloadManager {
    pub fn new(context: JobContext, max_concurrent: usize) -> Self {
        let gate = AdmissionGate::new(max_concurrent);
        log::info!("⚙️ Download manager ready ({} concurrent)", gate.limit());
        Self {
            context: Arc::new(context),
            gate: Arc::new(gate),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn submit(&self, job: DownloadJob) -> JobHandle {
        let job_id = job.id.clone();
        let queued = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        log::info!("📥 [QUEUE] Job {} submitted ({} in flight)", job_id, queued);

        let context = self.context.clone();
        let gate = self.gate.clone();
        let worker = tokio::spawn(async move { job.run(&context, &gate).await });

        // Supervisor: a panicking job still gets logged and accounted for.
        let in_flight = self.in_flight.clone();
        let supervised_id = job_id.clone();
        let handle = tokio::spawn(async move {
            let outcome = match worker.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::error!("💥 [QUEUE] Job {} aborted: {}", supervised_id, e);
                    JobOutcome::Failed
                }
            };
            in_flight.fetch_sub(1, Ordering::SeqCst);
            log::info!("📤 [QUEUE] Job {} finished: {:?}", supervised_id, outcome);
            outcome
        });

        JobHandle { job_id, handle }
    }

    pub fn running_jobs(&self) -> usize {
        self.gate.running()
    }

    /// Submitted jobs not holding a slot yet.
    pub fn queued_jobs(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst).saturating_sub(self.gate.running())
    }
}
