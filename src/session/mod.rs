use std::sync::Arc;
use moka::future::Cache;
use tokio::sync::Mutex;
use crate::errors::{AppError, Result};
use crate::i18n::Language;
use crate::search::SongResult;

pub type UserId = u64;

/// Volatile per-user state, gone when the process exits.
#[derive(Debug, Clone, Default)]
pub struct UserSession {
    pub language: Option<Language>,
    pub pending_url: Option<String>,
    pub last_query: Option<String>,
    /// Items of the page currently on screen, addressed 1..N.
    pub search_results: Vec<SongResult>,
}

/// Process-lifetime session store.
///
/// The outer map is moka's sharded concurrent cache built without capacity
/// or TTL, so entries are never evicted. Each user owns a separate mutex:
/// two users never contend, and one user's updates apply in order.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<UserId, Arc<Mutex<UserSession>>>,
    default_language: Language,
}

impl SessionStore {
    pub fn new(default_language: Language) -> Self {
        Self {
            sessions: Cache::builder().name("user-sessions").build(),
            default_language,
        }
    }

    async fn entry(&self, user_id: UserId) -> Arc<Mutex<UserSession>> {
        self.sessions
            .get_with(user_id, async { Arc::new(Mutex::new(UserSession::default())) })
            .await
    }

    async fn existing(&self, user_id: UserId) -> Option<Arc<Mutex<UserSession>>> {
        self.sessions.get(&user_id).await
    }

    pub async fn set_language(&self, user_id: UserId, language: Language) {
        self.entry(user_id).await.lock().await.language = Some(language);
    }

    pub async fn language(&self, user_id: UserId) -> Language {
        let Some(session) = self.existing(user_id).await else {
            return self.default_language;
        };
        let language = session.lock().await.language;
        language.unwrap_or(self.default_language)
    }

    pub async fn set_pending_url(&self, user_id: UserId, url: String) {
        self.entry(user_id).await.lock().await.pending_url = Some(url);
    }

    pub async fn pending_url(&self, user_id: UserId) -> Option<String> {
        let session = self.existing(user_id).await?;
        let guard = session.lock().await;
        guard.pending_url.clone()
    }

    pub async fn set_last_query(&self, user_id: UserId, query: String) {
        self.entry(user_id).await.lock().await.last_query = Some(query);
    }

    pub async fn last_query(&self, user_id: UserId) -> Option<String> {
        let session = self.existing(user_id).await?;
        let guard = session.lock().await;
        guard.last_query.clone()
    }

    /// Replaces the cached page; no history of earlier pages is kept.
    pub async fn set_search_results(&self, user_id: UserId, results: Vec<SongResult>) {
        self.entry(user_id).await.lock().await.search_results = results;
    }

    /// Resolves a 1-based choice against the cached page.
    ///
    /// `available == 0` in the error means nothing is cached for the user.
    pub async fn search_result(&self, user_id: UserId, index: usize) -> Result<SongResult> {
        let Some(session) = self.existing(user_id).await else {
            return Err(AppError::OutOfRange { index, available: 0 });
        };
        let guard = session.lock().await;
        let available = guard.search_results.len();
        let picked = index
            .checked_sub(1)
            .and_then(|i| guard.search_results.get(i))
            .cloned();
        picked.ok_or(AppError::OutOfRange { index, available })
    }
}
