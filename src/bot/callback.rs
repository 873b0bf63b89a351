use std::fmt;
use std::str::FromStr;
use crate::downloader::{MediaMode, VideoQuality};
use crate::errors::AppError;
use crate::i18n::Language;

/// Inline button payloads. The wire strings are shared with keyboards
/// already sitting in users' chats, so they must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackData {
    Language(Language),
    Quality(MediaMode),
    /// 1-based position in the displayed page.
    MusicPick(usize),
    MusicNext(usize),
}

impl fmt::Display for CallbackData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackData::Language(lang) => write!(f, "lang_{}", lang.code()),
            CallbackData::Quality(MediaMode::Audio) => write!(f, "q_mp3"),
            CallbackData::Quality(MediaMode::Video(q)) => write!(f, "q_{}", q.height()),
            CallbackData::MusicPick(index) => write!(f, "music_{}", index),
            CallbackData::MusicNext(page) => write!(f, "music_next_{}", page),
        }
    }
}

impl FromStr for CallbackData {
    type Err = AppError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::InvalidSelection(data.to_string());

        if let Some(code) = data.strip_prefix("lang_") {
            return Language::from_code(code).map(CallbackData::Language).ok_or_else(invalid);
        }
        if let Some(quality) = data.strip_prefix("q_") {
            if quality == "mp3" {
                return Ok(CallbackData::Quality(MediaMode::Audio));
            }
            return quality
                .parse::<u32>()
                .ok()
                .and_then(VideoQuality::from_height)
                .map(|q| CallbackData::Quality(MediaMode::Video(q)))
                .ok_or_else(invalid);
        }
        // `music_next_` shares the `music_` prefix
        if let Some(page) = data.strip_prefix("music_next_") {
            return page.parse().map(CallbackData::MusicNext).map_err(|_| invalid());
        }
        if let Some(index) = data.strip_prefix("music_") {
            return index.parse().map(CallbackData::MusicPick).map_err(|_| invalid());
        }
        Err(invalid())
    }
}
