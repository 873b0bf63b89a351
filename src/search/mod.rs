use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::errors::Result;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Raw candidate as reported by the search backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongResult {
    pub title: String,
    pub url: String,
    pub duration_seconds: u64,
}

impl SongResult {
    /// Entries without an id cannot be downloaded and are dropped.
    fn from_entry(entry: &SearchEntry) -> Option<Self> {
        let id = entry.id.as_deref().map(str::trim).filter(|id| !id.is_empty())?;
        let title = entry
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| id.to_string());
        let duration_seconds = entry
            .duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(|d| d.round() as u64)
            .unwrap_or(0);

        Some(Self {
            title,
            url: format!("{}{}", WATCH_URL_PREFIX, id),
            duration_seconds,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    pub page: usize,
    pub total: usize,
    pub total_pages: usize,
    pub results: Vec<SongResult>,
}

impl SearchPage {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Search collaborator. `None` marks a slot the backend returned but could
/// not describe; it still counts toward `total`.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Option<SearchEntry>>>;
}

pub fn total_pages(total: usize, page_size: usize) -> usize {
    if total == 0 {
        1
    } else {
        total.div_ceil(page_size)
    }
}

pub struct SearchPager {
    provider: Arc<dyn SearchProvider>,
    page_size: usize,
    candidate_limit: usize,
}

impl SearchPager {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self::with_limits(provider, DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_LIMIT)
    }

    pub fn with_limits(provider: Arc<dyn SearchProvider>, page_size: usize, candidate_limit: usize) -> Self {
        Self {
            provider,
            page_size: page_size.max(1),
            candidate_limit: candidate_limit.max(1),
        }
    }

    /// Fetches the bounded candidate set and returns one page of it.
    ///
    /// No results and pages past the end are empty pages, not errors. Only a
    /// failing backend yields `Err`.
    pub async fn paginate(&self, query: &str, page: usize) -> Result<SearchPage> {
        let page = page.max(1);
        log::info!("🔍 [SEARCH] '{}' page {} (limit {})", query, page, self.candidate_limit);

        let candidates = self.provider.search(query, self.candidate_limit).await?;
        let total = candidates.len();

        let start = (page - 1).saturating_mul(self.page_size);
        let results: Vec<SongResult> = candidates
            .iter()
            .skip(start)
            .take(self.page_size)
            .filter_map(|slot| slot.as_ref().and_then(SongResult::from_entry))
            .collect();

        log::info!("📊 [SEARCH] '{}': {} candidates, {} on page {}", query, total, results.len(), page);
        Ok(SearchPage {
            page,
            total,
            total_pages: total_pages(total, self.page_size),
            results,
        })
    }
}
