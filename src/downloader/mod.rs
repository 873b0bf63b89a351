pub mod job;
pub mod manager;
pub mod workspace;
pub mod ytdlp;

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::errors::Result;
use crate::session::UserId;
use crate::transport::ChatId;

pub const AUDIO_CODEC: &str = "mp3";
pub const AUDIO_BITRATE_KBPS: u32 = 192;
pub const VIDEO_CONTAINER: &str = "mp4";
pub const OUTPUT_TEMPLATE: &str = "%(title).200s.%(ext)s";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoQuality {
    P360,
    P720,
    P1080,
}

impl VideoQuality {
    pub const ALL: [VideoQuality; 3] = [VideoQuality::P360, VideoQuality::P720, VideoQuality::P1080];

    /// Vertical resolution ceiling.
    pub fn height(&self) -> u32 {
        match self {
            VideoQuality::P360 => 360,
            VideoQuality::P720 => 720,
            VideoQuality::P1080 => 1080,
        }
    }

    pub fn from_height(height: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.height() == height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaMode {
    Video(VideoQuality),
    Audio,
}

impl MediaMode {
    pub fn label(&self) -> String {
        match self {
            MediaMode::Video(q) => format!("video {}p", q.height()),
            MediaMode::Audio => "mp3".to_string(),
        }
    }

    /// Collaborator configuration for this mode, writing into `workspace`.
    pub fn extract_request(&self, workspace: &Path) -> ExtractRequest {
        let output_template = workspace.join(OUTPUT_TEMPLATE).to_string_lossy().to_string();
        match self {
            MediaMode::Audio => ExtractRequest {
                format_selector: "bestaudio/best".to_string(),
                output_template,
                postprocess: Some(AudioTranscode {
                    codec: AUDIO_CODEC.to_string(),
                    bitrate_kbps: AUDIO_BITRATE_KBPS,
                }),
                merge_container: None,
            },
            MediaMode::Video(quality) => ExtractRequest {
                format_selector: format!("bestvideo[height<={}]+bestaudio/best", quality.height()),
                output_template,
                postprocess: None,
                merge_container: Some(VIDEO_CONTAINER.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioTranscode {
    pub codec: String,
    pub bitrate_kbps: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractRequest {
    pub format_selector: String,
    pub output_template: String,
    pub postprocess: Option<AudioTranscode>,
    pub merge_container: Option<String>,
}

/// Media extraction/transcoding backend. Writes artifact file(s) wherever
/// `request.output_template` points.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    async fn extract(&self, source: &str, request: &ExtractRequest) -> Result<()>;
}

/// One download request, from dispatch until its workspace is removed.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub id: String,
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub source_url: String,
    pub mode: MediaMode,
    pub workspace_path: PathBuf,
}

impl DownloadJob {
    /// The workspace name carries user and timestamp plus a random suffix, so
    /// two jobs of one user in the same second still get separate directories.
    pub fn new(user_id: UserId, chat_id: ChatId, source_url: String, mode: MediaMode, tmp_root: &Path) -> Self {
        let id = crate::utils::generate_job_id();
        let timestamp = chrono::Utc::now().timestamp();
        let workspace_path = tmp_root.join(format!("{}_{}_{}", user_id, timestamp, &id[..8]));
        Self {
            id,
            user_id,
            chat_id,
            source_url,
            mode,
            workspace_path,
        }
    }
}
