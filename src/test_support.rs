//! In-memory collaborators for unit tests.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use async_trait::async_trait;
use crate::downloader::{ExtractRequest, MediaExtractor};
use crate::errors::{AppError, Result};
use crate::search::{SearchEntry, SearchProvider};
use crate::transport::{ChatId, Keyboard, MessageId, Transport};

pub struct StaticSearch {
    slots: Vec<Option<SearchEntry>>,
    fail: bool,
    queries: Mutex<Vec<(String, usize)>>,
}

impl StaticSearch {
    pub fn new(slots: Vec<Option<SearchEntry>>) -> Self {
        Self {
            slots,
            fail: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// `count` valid entries with ids `vid{i}` and titles `{query} #{i}`.
    /// Titles are filled in per query, so the stored title is a marker.
    pub fn with_count(count: usize) -> Self {
        Self::new(
            (0..count)
                .map(|i| {
                    Some(SearchEntry {
                        id: Some(format!("vid{}", i)),
                        title: None,
                        duration: Some(180.0 + i as f64),
                    })
                })
                .collect(),
        )
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Option<SearchEntry>>> {
        self.queries.lock().unwrap().push((query.to_string(), limit));
        if self.fail {
            return Err(AppError::Search("backend unavailable".to_string()));
        }
        Ok(self
            .slots
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, slot)| {
                slot.clone().map(|mut entry| {
                    if entry.title.is_none() && entry.id.as_deref() == Some(format!("vid{}", i).as_str()) {
                        entry.title = Some(format!("{} #{}", query, i));
                    }
                    entry
                })
            })
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text { chat_id: ChatId, text: String },
    Keyboard { chat_id: ChatId, text: String, keyboard: Keyboard },
    Edit { chat_id: ChatId, message_id: MessageId, text: String, keyboard: Option<Keyboard> },
    Audio { chat_id: ChatId, file: PathBuf, existed: bool },
    Video { chat_id: ChatId, file: PathBuf, existed: bool },
    Document { chat_id: ChatId, file: PathBuf, existed: bool },
}

/// Records every outbound call. Rejected uploads are not recorded.
#[derive(Default)]
pub struct RecordingTransport {
    events: Mutex<Vec<Sent>>,
    reject_video: bool,
    reject_document: bool,
    reject_audio: bool,
    upload_delay: Duration,
    uploads_finished: Mutex<Vec<Instant>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_video(mut self) -> Self {
        self.reject_video = true;
        self
    }

    pub fn rejecting_document(mut self) -> Self {
        self.reject_document = true;
        self
    }

    pub fn rejecting_audio(mut self) -> Self {
        self.reject_audio = true;
        self
    }

    /// Every upload takes `delay` before it returns.
    pub fn with_upload_delay(mut self, delay: Duration) -> Self {
        self.upload_delay = delay;
        self
    }

    pub fn events(&self) -> Vec<Sent> {
        self.events.lock().unwrap().clone()
    }

    /// When each accepted upload returned, in completion order.
    pub fn upload_finish_times(&self) -> Vec<Instant> {
        self.uploads_finished.lock().unwrap().clone()
    }

    /// Plain text messages sent to `chat`, in order.
    pub fn texts(&self, chat: ChatId) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Sent::Text { chat_id, text } if chat_id == chat => Some(text),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Sent) {
        self.events.lock().unwrap().push(event);
    }

    async fn upload(&self, reject: bool, file: &Path, make: impl FnOnce(PathBuf, bool) -> Sent) -> Result<()> {
        if reject {
            return Err(AppError::Delivery(format!("rejected {:?}", file)));
        }
        let existed = file.is_file();
        if !self.upload_delay.is_zero() {
            tokio::time::sleep(self.upload_delay).await;
        }
        self.push(make(file.to_path_buf(), existed));
        self.uploads_finished.lock().unwrap().push(Instant::now());
        Ok(())
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.push(Sent::Text { chat_id, text: text.to_string() });
        Ok(())
    }

    async fn send_keyboard(&self, chat_id: ChatId, text: &str, keyboard: &Keyboard) -> Result<()> {
        self.push(Sent::Keyboard {
            chat_id,
            text: text.to_string(),
            keyboard: keyboard.clone(),
        });
        Ok(())
    }

    async fn edit_text(&self, chat_id: ChatId, message_id: MessageId, text: &str, keyboard: Option<&Keyboard>) -> Result<()> {
        self.push(Sent::Edit {
            chat_id,
            message_id,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }

    async fn send_audio(&self, chat_id: ChatId, file: &Path) -> Result<()> {
        self.upload(self.reject_audio, file, |file, existed| Sent::Audio { chat_id, file, existed }).await
    }

    async fn send_video(&self, chat_id: ChatId, file: &Path) -> Result<()> {
        self.upload(self.reject_video, file, |file, existed| Sent::Video { chat_id, file, existed }).await
    }

    async fn send_document(&self, chat_id: ChatId, file: &Path) -> Result<()> {
        self.upload(self.reject_document, file, |file, existed| Sent::Document { chat_id, file, existed }).await
    }
}

/// Writes fixed files next to the output template, optionally after a delay.
/// Tracks how many extractions overlap.
#[derive(Default)]
pub struct ScriptedExtractor {
    files: Vec<(String, usize)>,
    delay: Duration,
    fail: bool,
    active: AtomicUsize,
    peak: AtomicUsize,
    calls: Mutex<Vec<(String, ExtractRequest)>>,
    started: Mutex<Vec<Instant>>,
}

impl ScriptedExtractor {
    pub fn producing(files: &[(&str, usize)]) -> Self {
        Self {
            files: files.iter().map(|(name, size)| (name.to_string(), *size)).collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<(String, ExtractRequest)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// When each extraction began, in start order.
    pub fn start_times(&self) -> Vec<Instant> {
        self.started.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaExtractor for ScriptedExtractor {
    async fn extract(&self, source: &str, request: &ExtractRequest) -> Result<()> {
        self.started.lock().unwrap().push(Instant::now());
        self.calls.lock().unwrap().push((source.to_string(), request.clone()));
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let result = if self.fail {
            Err(AppError::Extraction("scripted failure".to_string()))
        } else {
            let dir = Path::new(&request.output_template)
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            self.files
                .iter()
                .try_for_each(|(name, size)| std::fs::write(dir.join(name), vec![0u8; *size]))
                .map_err(AppError::from)
        };

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
