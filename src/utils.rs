use std::sync::OnceLock;
use chrono::NaiveDate;
use regex::Regex;
use url::Url;

static URL_RE: OnceLock<Regex> = OnceLock::new();

/// Returns the first `http(s)://` link in a message, if it parses as a URL.
pub fn extract_url(text: &str) -> Option<String> {
    let re = URL_RE.get_or_init(|| Regex::new(r"https?://[^\s]+").expect("static URL pattern"));
    let candidate = re.find(text)?.as_str();
    match Url::parse(candidate) {
        Ok(url) if url.host_str().is_some() => Some(candidate.to_string()),
        _ => None,
    }
}

/// Calendar day used as the stats ledger key.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn unix_now() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// `m:ss`, or `h:mm:ss` once past an hour.
pub fn format_duration(seconds: u64) -> String {
    let (h, m, s) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Generates a unique ID for download jobs
pub fn generate_job_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
