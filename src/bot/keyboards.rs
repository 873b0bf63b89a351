use crate::bot::callback::CallbackData;
use crate::downloader::{MediaMode, VideoQuality};
use crate::i18n::{t, Language, Text};
use crate::search::SearchPage;
use crate::stats::{DailyStats, StatsSnapshot};
use crate::transport::{Button, Keyboard};
use crate::utils::format_duration;

const RESULT_BUTTONS_PER_ROW: usize = 5;

fn button(label: impl Into<String>, data: CallbackData) -> Button {
    Button::new(label, data.to_string())
}

/// One language per row.
pub fn language_keyboard() -> Keyboard {
    Keyboard::new(
        Language::ALL
            .iter()
            .map(|lang| vec![button(lang.label(), CallbackData::Language(*lang))])
            .collect(),
    )
}

pub fn quality_keyboard() -> Keyboard {
    let video = |q: VideoQuality| button(format!("{}p", q.height()), CallbackData::Quality(MediaMode::Video(q)));
    Keyboard::new(vec![
        vec![video(VideoQuality::P360), video(VideoQuality::P720)],
        vec![video(VideoQuality::P1080), button("MP3", CallbackData::Quality(MediaMode::Audio))],
    ])
}

/// Numbered pick buttons for the page, plus a next-page button when there is one.
pub fn results_keyboard(lang: Language, page: &SearchPage) -> Keyboard {
    let picks: Vec<Button> = (1..=page.results.len())
        .map(|i| button(i.to_string(), CallbackData::MusicPick(i)))
        .collect();
    let mut rows: Vec<Vec<Button>> = picks.chunks(RESULT_BUTTONS_PER_ROW).map(<[Button]>::to_vec).collect();

    if page.has_next() {
        rows.push(vec![button(t(lang, Text::NextPage), CallbackData::MusicNext(page.page + 1))]);
    }
    Keyboard::new(rows)
}

pub fn render_results(lang: Language, page: &SearchPage) -> String {
    let mut text = format!("{} ({}/{})\n", t(lang, Text::ResultsHeader), page.page, page.total_pages);
    for (i, song) in page.results.iter().enumerate() {
        if song.duration_seconds > 0 {
            text.push_str(&format!("\n{}. {} ({})", i + 1, song.title, format_duration(song.duration_seconds)));
        } else {
            text.push_str(&format!("\n{}. {}", i + 1, song.title));
        }
    }
    text
}

/// Dispatcher load at the time of the report.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobLoad {
    pub running: usize,
    pub queued: usize,
}

pub fn admin_report(lang: Language, totals: &StatsSnapshot, today: &DailyStats, uptime_secs: u64, load: JobLoad) -> String {
    let hours = uptime_secs / 3600;
    let minutes = (uptime_secs % 3600) / 60;
    format!(
        "{title}\n\n\
         {users}: {total_users}\n\
         {videos}: {total_videos}\n\
         {mp3}: {total_mp3}\n\n\
         {today}:\n\
         {active}: {active_today}\n\
         🎬 Video: {videos_today}\n\
         🎧 MP3: {mp3_today}\n\n\
         {jobs}: {running} / {queued}\n\
         {uptime}: {hours} {h} {minutes} {m}",
        title = t(lang, Text::AdminTitle),
        users = t(lang, Text::AdminUsers),
        total_users = totals.total_users,
        videos = t(lang, Text::AdminVideos),
        total_videos = totals.total_videos,
        mp3 = t(lang, Text::AdminMp3),
        total_mp3 = totals.total_mp3,
        today = t(lang, Text::AdminToday),
        active = t(lang, Text::AdminActive),
        active_today = today.users.len(),
        videos_today = today.videos,
        mp3_today = today.mp3,
        jobs = t(lang, Text::AdminJobs),
        running = load.running,
        queued = load.queued,
        uptime = t(lang, Text::AdminUptime),
        h = t(lang, Text::AdminHours),
        m = t(lang, Text::AdminMinutes),
    )
}
