use std::process::{Command, Stdio};
use async_trait::async_trait;
use crate::downloader::{ExtractRequest, MediaExtractor};
use crate::errors::{AppError, Result};
use crate::search::{SearchEntry, SearchProvider};

/// Search and extraction through the `yt-dlp` executable.
#[derive(Debug, Clone)]
pub struct YtDlpClient {
    ytdlp_path: String,
}

impl YtDlpClient {
    pub fn new(ytdlp_path: impl Into<String>) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
        }
    }

    async fn run(&self, args: Vec<String>, tag: &'static str) -> Result<std::process::Output> {
        let program = self.ytdlp_path.clone();
        log::info!("🚀 [{}] Running {} {}", tag, program, args.join(" "));

        // yt-dlp blocks for as long as the download takes
        let output = tokio::task::spawn_blocking(move || {
            Command::new(&program)
                .args(&args)
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()?
                .wait_with_output()
        })
        .await
        .map_err(|e| AppError::Unknown(format!("yt-dlp task failed: {}", e)))??;

        log::info!("📊 [{}] yt-dlp exit status: {}", tag, output.status);
        Ok(output)
    }
}

pub fn search_args(query: &str, limit: usize) -> Vec<String> {
    vec![
        "--flat-playlist".to_string(),
        "--dump-json".to_string(),
        "--skip-download".to_string(),
        "--no-warnings".to_string(),
        "--ignore-errors".to_string(),
        format!("ytsearch{}:{}", limit, query),
    ]
}

pub fn extract_args(source: &str, request: &ExtractRequest) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        request.format_selector.clone(),
        "-o".to_string(),
        request.output_template.clone(),
        "--no-playlist".to_string(),
        "--quiet".to_string(),
        "--no-warnings".to_string(),
    ];
    if let Some(transcode) = &request.postprocess {
        args.extend([
            "-x".to_string(),
            "--audio-format".to_string(),
            transcode.codec.clone(),
            "--audio-quality".to_string(),
            format!("{}K", transcode.bitrate_kbps),
        ]);
    }
    if let Some(container) = &request.merge_container {
        args.extend(["--merge-output-format".to_string(), container.clone()]);
    }
    // `--` keeps a source starting with '-' from being read as an option
    args.extend(["--".to_string(), source.to_string()]);
    args
}

/// One JSON object per line; lines that do not parse become empty slots.
pub fn parse_search_output(stdout: &str) -> Vec<Option<SearchEntry>> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| match serde_json::from_str::<SearchEntry>(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("⚠️ [SEARCH] Failed to parse line {}: {}", i + 1, e);
                None
            }
        })
        .collect()
}

#[async_trait]
impl SearchProvider for YtDlpClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Option<SearchEntry>>> {
        let output = self.run(search_args(query, limit), "SEARCH").await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        // --ignore-errors exits non-zero when some entries fail; keep what came back
        if !output.status.success() && stdout.trim().is_empty() {
            let error = String::from_utf8_lossy(&output.stderr);
            log::error!("❌ [SEARCH] yt-dlp search failed: {}", error);
            return Err(AppError::Search(format!("yt-dlp search failed: {}", error.trim())));
        }

        let entries = parse_search_output(&stdout);
        log::info!("📊 [SEARCH] {} candidates for '{}'", entries.len(), query);
        Ok(entries)
    }
}

#[async_trait]
impl MediaExtractor for YtDlpClient {
    async fn extract(&self, source: &str, request: &ExtractRequest) -> Result<()> {
        let output = self.run(extract_args(source, request), "DOWNLOAD").await?;
        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            log::error!("❌ [DOWNLOAD] yt-dlp failed for {}: {}", source, error);
            return Err(AppError::Extraction(format!("yt-dlp failed: {}", error.trim())));
        }
        Ok(())
    }
}
