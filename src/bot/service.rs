use std::path::PathBuf;
use std::sync::Arc;
use crate::bot::callback::CallbackData;
use crate::bot::keyboards::{self, JobLoad};
use crate::downloader::manager::{DownloadManager, JobHandle};
use crate::downloader::{DownloadJob, MediaMode};
use crate::errors::{AppError, Result};
use crate::i18n::{t, Text, CHOOSE_LANGUAGE};
use crate::search::SearchPager;
use crate::session::{SessionStore, UserId};
use crate::stats::StatsLedger;
use crate::transport::{ChatId, MessageId, Transport};

/// Platform-independent handlers for commands, text and button presses.
///
/// Transport errors are returned to the caller; everything else ends in a
/// localized notice to the user.
pub struct BotService {
    transport: Arc<dyn Transport>,
    sessions: SessionStore,
    pager: SearchPager,
    downloads: DownloadManager,
    stats: Arc<StatsLedger>,
    admin_user_id: UserId,
    tmp_root: PathBuf,
}

impl BotService {
    pub fn new(
        transport: Arc<dyn Transport>,
        sessions: SessionStore,
        pager: SearchPager,
        downloads: DownloadManager,
        stats: Arc<StatsLedger>,
        admin_user_id: UserId,
        tmp_root: PathBuf,
    ) -> Self {
        Self {
            transport,
            sessions,
            pager,
            downloads,
            stats,
            admin_user_id,
            tmp_root,
        }
    }

    pub async fn handle_start(&self, chat_id: ChatId) -> Result<()> {
        self.transport
            .send_keyboard(chat_id, CHOOSE_LANGUAGE, &keyboards::language_keyboard())
            .await
    }

    pub async fn handle_text(&self, user_id: UserId, chat_id: ChatId, text: &str) -> Result<()> {
        let text = text.trim();
        let lang = self.sessions.language(user_id).await;

        if text.starts_with('/') {
            log::debug!("🤷 [TEXT] Ignoring unknown command from {}: {}", user_id, text);
            return Ok(());
        }
        if text.is_empty() {
            return self.transport.send_text(chat_id, t(lang, Text::NoUrl)).await;
        }

        if let Some(url) = crate::utils::extract_url(text) {
            log::info!("🔗 [TEXT] User {} sent {}", user_id, url);
            self.sessions.set_pending_url(user_id, url).await;
            return self
                .transport
                .send_keyboard(chat_id, t(lang, Text::ChooseQuality), &keyboards::quality_keyboard())
                .await;
        }

        self.sessions.set_last_query(user_id, text.to_string()).await;
        let page = match self.pager.paginate(text, 1).await {
            Ok(page) => page,
            Err(e) => {
                log::error!("❌ [SEARCH] '{}' failed for user {}: {}", text, user_id, e);
                return self.transport.send_text(chat_id, t(lang, Text::Error)).await;
            }
        };
        if page.results.is_empty() {
            return self.transport.send_text(chat_id, t(lang, Text::NothingFound)).await;
        }

        let keyboard = keyboards::results_keyboard(lang, &page);
        let listing = keyboards::render_results(lang, &page);
        self.sessions.set_search_results(user_id, page.results).await;
        self.transport.send_keyboard(chat_id, &listing, &keyboard).await
    }

    /// Handles a button press on `message_id`. Returns the handle of the job
    /// it dispatched, if any.
    pub async fn handle_callback(
        &self,
        user_id: UserId,
        chat_id: ChatId,
        message_id: MessageId,
        data: &str,
    ) -> Result<Option<JobHandle>> {
        let callback = match data.parse::<CallbackData>() {
            Ok(callback) => callback,
            Err(e) => {
                log::warn!("⚠️ [CALLBACK] Ignoring payload from {}: {}", user_id, e);
                return Ok(None);
            }
        };
        log::info!("👆 [CALLBACK] User {} pressed {}", user_id, callback);

        match callback {
            CallbackData::Language(lang) => {
                self.sessions.set_language(user_id, lang).await;
                self.transport.edit_text(chat_id, message_id, t(lang, Text::Start), None).await?;
                Ok(None)
            }
            CallbackData::Quality(mode) => self.choose_quality(user_id, chat_id, message_id, mode).await,
            CallbackData::MusicPick(index) => self.pick_song(user_id, chat_id, message_id, index).await,
            CallbackData::MusicNext(page) => {
                self.next_page(user_id, chat_id, message_id, page).await?;
                Ok(None)
            }
        }
    }

    async fn choose_quality(&self, user_id: UserId, chat_id: ChatId, message_id: MessageId, mode: MediaMode) -> Result<Option<JobHandle>> {
        let Some(url) = self.sessions.pending_url(user_id).await else {
            log::info!("🤷 [CALLBACK] User {} chose {} with no pending link", user_id, mode.label());
            return Ok(None);
        };
        let lang = self.sessions.language(user_id).await;
        self.transport.edit_text(chat_id, message_id, t(lang, Text::Starting), None).await?;
        Ok(Some(self.dispatch(user_id, chat_id, url, mode)))
    }

    async fn pick_song(&self, user_id: UserId, chat_id: ChatId, message_id: MessageId, index: usize) -> Result<Option<JobHandle>> {
        let lang = self.sessions.language(user_id).await;
        let song = match self.sessions.search_result(user_id, index).await {
            Ok(song) => song,
            Err(AppError::OutOfRange { available: 0, .. }) => {
                self.transport.send_text(chat_id, t(lang, Text::ListExpired)).await?;
                return Ok(None);
            }
            Err(e) => {
                log::info!("🤷 [CALLBACK] User {}: {}", user_id, e);
                self.transport.send_text(chat_id, t(lang, Text::InvalidChoice)).await?;
                return Ok(None);
            }
        };

        log::info!("🎵 [CALLBACK] User {} picked '{}'", user_id, song.title);
        self.transport.edit_text(chat_id, message_id, t(lang, Text::Downloading), None).await?;
        Ok(Some(self.dispatch(user_id, chat_id, song.url, MediaMode::Audio)))
    }

    async fn next_page(&self, user_id: UserId, chat_id: ChatId, message_id: MessageId, page: usize) -> Result<()> {
        let lang = self.sessions.language(user_id).await;
        let Some(query) = self.sessions.last_query(user_id).await else {
            return self.transport.edit_text(chat_id, message_id, t(lang, Text::SearchNotFound), None).await;
        };

        let page = match self.pager.paginate(&query, page).await {
            Ok(page) => page,
            Err(e) => {
                log::error!("❌ [SEARCH] '{}' page {} failed for user {}: {}", query, page, user_id, e);
                return self.transport.send_text(chat_id, t(lang, Text::Error)).await;
            }
        };
        if page.results.is_empty() {
            return self.transport.edit_text(chat_id, message_id, t(lang, Text::NothingFound), None).await;
        }

        let keyboard = keyboards::results_keyboard(lang, &page);
        let listing = keyboards::render_results(lang, &page);
        self.sessions.set_search_results(user_id, page.results).await;
        self.transport.edit_text(chat_id, message_id, &listing, Some(&keyboard)).await
    }

    fn dispatch(&self, user_id: UserId, chat_id: ChatId, url: String, mode: MediaMode) -> JobHandle {
        let job = DownloadJob::new(user_id, chat_id, url, mode, &self.tmp_root);
        self.downloads.submit(job)
    }

    /// Usage snapshot for the privileged user; silence for everyone else.
    pub async fn handle_admin(&self, user_id: UserId, chat_id: ChatId) -> Result<()> {
        if user_id != self.admin_user_id {
            log::warn!("🚫 [ADMIN] Denied for user {}", user_id);
            return Ok(());
        }

        let totals = self.stats.snapshot().await;
        let today = self.stats.day(crate::utils::today()).await;
        let uptime = (crate::utils::unix_now() - totals.start_time).max(0.0) as u64;
        let load = JobLoad {
            running: self.downloads.running_jobs(),
            queued: self.downloads.queued_jobs(),
        };
        let lang = self.sessions.language(user_id).await;
        let report = keyboards::admin_report(lang, &totals, &today, uptime, load);
        self.transport.send_text(chat_id, &report).await
    }
}
