use std::path::Path;
use std::sync::Arc;
use chrono::NaiveDate;
use crate::downloader::manager::AdmissionGate;
use crate::downloader::workspace::{select_largest_file, Workspace};
use crate::downloader::{DownloadJob, MediaExtractor, MediaMode};
use crate::errors::{AppError, Result};
use crate::i18n::{t, Text};
use crate::session::SessionStore;
use crate::stats::StatsLedger;
use crate::transport::Transport;

/// Collaborators a job needs while it runs.
pub struct JobContext {
    pub transport: Arc<dyn Transport>,
    pub extractor: Arc<dyn MediaExtractor>,
    pub stats: Arc<StatsLedger>,
    pub sessions: SessionStore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Delivered,
    Failed,
}

impl DownloadJob {
    /// Runs the job to its single terminal notice.
    ///
    /// Demand is counted before anything can fail. The admission permit is
    /// held from extraction through delivery. The workspace is gone when this
    /// returns, whichever way it went.
    pub async fn run(self, ctx: &JobContext, gate: &AdmissionGate) -> JobOutcome {
        let started = std::time::Instant::now();
        log::info!("🎬 [JOB {}] user {} requested {} of {}", self.id, self.user_id, self.mode.label(), self.source_url);

        self.record_demand(ctx, crate::utils::today()).await;

        let workspace = match Workspace::create(&self.workspace_path).await {
            Ok(workspace) => workspace,
            Err(e) => {
                log::error!("❌ [JOB {}] Could not create workspace {:?}: {}", self.id, self.workspace_path, e);
                self.notify_terminal(ctx, Text::Error).await;
                return JobOutcome::Failed;
            }
        };

        let language = ctx.sessions.language(self.user_id).await;
        if let Err(e) = ctx.transport.send_text(self.chat_id, t(language, Text::Downloading)).await {
            log::warn!("⚠️ [JOB {}] Could not send progress notice: {}", self.id, e);
        }

        let outcome = match self.download_and_deliver(ctx, gate, &workspace).await {
            Ok(()) => {
                let done = match self.mode {
                    MediaMode::Audio => Text::SentAudio,
                    MediaMode::Video(_) => Text::SentVideo,
                };
                self.notify_terminal(ctx, done).await;
                log::info!("✅ [JOB {}] Delivered (took {:.2} seconds)", self.id, started.elapsed().as_secs_f64());
                JobOutcome::Delivered
            }
            Err(e) => {
                log::error!("❌ [JOB {}] Failed after {:.2} seconds: {}", self.id, started.elapsed().as_secs_f64(), e);
                self.notify_terminal(ctx, Text::Error).await;
                JobOutcome::Failed
            }
        };

        workspace.remove().await;
        outcome
    }

    /// Counters measure requests, not successes, so a ledger failure is only logged.
    async fn record_demand(&self, ctx: &JobContext, date: NaiveDate) {
        if let Err(e) = self.try_record_demand(&ctx.stats, date).await {
            log::error!("❌ [STATS] Could not record job {}: {}", self.id, e);
        }
    }

    async fn try_record_demand(&self, stats: &StatsLedger, date: NaiveDate) -> Result<()> {
        stats.record_user(date, self.user_id).await?;
        match self.mode {
            MediaMode::Audio => stats.record_mp3(date).await,
            MediaMode::Video(_) => stats.record_video(date).await,
        }
    }

    async fn download_and_deliver(&self, ctx: &JobContext, gate: &AdmissionGate, workspace: &Workspace) -> Result<()> {
        log::info!("⏳ [JOB {}] Waiting for a download slot ({} running)", self.id, gate.running());
        let _admission = gate.admit().await?;

        let request = self.mode.extract_request(workspace.path());
        log::info!("⬇️ [JOB {}] Extracting with format '{}'", self.id, request.format_selector);
        ctx.extractor.extract(&self.source_url, &request).await?;

        let artifact = select_largest_file(workspace.path()).await?;
        log::info!("📦 [JOB {}] Artifact {:?}", self.id, artifact);
        self.deliver(ctx, &artifact).await
    }

    async fn deliver(&self, ctx: &JobContext, artifact: &Path) -> Result<()> {
        match self.mode {
            MediaMode::Audio => ctx
                .transport
                .send_audio(self.chat_id, artifact)
                .await
                .map_err(|e| AppError::Delivery(format!("audio rejected: {}", e))),
            MediaMode::Video(_) => match ctx.transport.send_video(self.chat_id, artifact).await {
                Ok(()) => Ok(()),
                Err(e) => {
                    log::warn!("⚠️ [JOB {}] Video delivery rejected ({}), sending as file", self.id, e);
                    ctx.transport
                        .send_document(self.chat_id, artifact)
                        .await
                        .map_err(|e| AppError::Delivery(format!("video and file delivery rejected: {}", e)))
                }
            },
        }
    }

    async fn notify_terminal(&self, ctx: &JobContext, key: Text) {
        let language = ctx.sessions.language(self.user_id).await;
        if let Err(e) = ctx.transport.send_text(self.chat_id, t(language, key)).await {
            log::error!("❌ [JOB {}] Could not send final notice: {}", self.id, e);
        }
    }
}
