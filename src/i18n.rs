use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Uz,
    Ru,
    En,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Uz, Language::Ru, Language::En];

    pub fn code(&self) -> &'static str {
        match self {
            Language::Uz => "uz",
            Language::Ru => "ru",
            Language::En => "en",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.code() == code)
    }

    /// Label shown on the language picker.
    pub fn label(&self) -> &'static str {
        match self {
            Language::Uz => "🇺🇿 O'zbekcha",
            Language::Ru => "🇷🇺 Русский",
            Language::En => "🇬🇧 English",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    Start,
    ChooseQuality,
    Starting,
    Downloading,
    SentVideo,
    SentAudio,
    NoUrl,
    Error,
    NothingFound,
    ResultsHeader,
    SearchNotFound,
    ListExpired,
    InvalidChoice,
    NextPage,
    AdminTitle,
    AdminUsers,
    AdminVideos,
    AdminMp3,
    AdminToday,
    AdminActive,
    AdminUptime,
    AdminHours,
    AdminMinutes,
    AdminJobs,
}

/// Prompt shown before any language is picked, so it carries all three.
pub const CHOOSE_LANGUAGE: &str = "Tilni tanlang / Выберите язык / Choose language:";

pub fn t(lang: Language, key: Text) -> &'static str {
    match lang {
        Language::Uz => uz(key),
        Language::Ru => ru(key),
        Language::En => en(key),
    }
}

fn uz(key: Text) -> &'static str {
    match key {
        Text::Start => "Salom! Link yoki qo‘shiq nomini yozing 🎵",
        Text::ChooseQuality => "Sifatni tanlang:",
        Text::Starting => "⏳ Boshlanmoqda...",
        Text::Downloading => "⏳ Yuklanmoqda...",
        Text::SentVideo => "🎬 Video tayyor",
        Text::SentAudio => "🎧 MP3 tayyor",
        Text::NoUrl => "Iltimos, link yoki qo‘shiq nomini yozing",
        Text::Error => "❌ Xatolik yuz berdi",
        Text::NothingFound => "❌ Hech narsa topilmadi",
        Text::ResultsHeader => "🎵 Topilgan qo‘shiqlar:",
        Text::SearchNotFound => "❌ Qidiruv topilmadi.",
        Text::ListExpired => "❌ Ro‘yxat eskirgan, qayta qidiring",
        Text::InvalidChoice => "❌ Noto‘g‘ri tanlov",
        Text::NextPage => "➡️ Keyingi",
        Text::AdminTitle => "📊 ADMIN PANEL",
        Text::AdminUsers => "👥 Jami userlar",
        Text::AdminVideos => "🎬 Jami video",
        Text::AdminMp3 => "🎧 Jami MP3",
        Text::AdminToday => "📅 Bugun",
        Text::AdminActive => "👤 Aktiv",
        Text::AdminUptime => "⏱ Uptime",
        Text::AdminHours => "soat",
        Text::AdminMinutes => "daqiqa",
        Text::AdminJobs => "⚙️ Yuklashlar (faol / navbatda)",
    }
}

fn ru(key: Text) -> &'static str {
    match key {
        Text::Start => "Привет! Отправь ссылку или название песни 🎵",
        Text::ChooseQuality => "Выберите качество:",
        Text::Starting => "⏳ Начинаем...",
        Text::Downloading => "⏳ Скачивается...",
        Text::SentVideo => "🎬 Видео готово",
        Text::SentAudio => "🎧 MP3 готов",
        Text::NoUrl => "Отправьте ссылку или название песни",
        Text::Error => "❌ Ошибка",
        Text::NothingFound => "❌ Ничего не найдено",
        Text::ResultsHeader => "🎵 Найденные песни:",
        Text::SearchNotFound => "❌ Поиск не найден.",
        Text::ListExpired => "❌ Список устарел, повторите поиск",
        Text::InvalidChoice => "❌ Неверный выбор",
        Text::NextPage => "➡️ Далее",
        Text::AdminTitle => "📊 ADMIN PANEL",
        Text::AdminUsers => "👥 Всего пользователей",
        Text::AdminVideos => "🎬 Всего видео",
        Text::AdminMp3 => "🎧 Всего MP3",
        Text::AdminToday => "📅 Сегодня",
        Text::AdminActive => "👤 Активные",
        Text::AdminUptime => "⏱ Аптайм",
        Text::AdminHours => "ч",
        Text::AdminMinutes => "мин",
        Text::AdminJobs => "⚙️ Загрузки (активные / в очереди)",
    }
}

fn en(key: Text) -> &'static str {
    match key {
        Text::Start => "Hi! Send link or song name 🎵",
        Text::ChooseQuality => "Choose quality:",
        Text::Starting => "⏳ Starting...",
        Text::Downloading => "⏳ Downloading...",
        Text::SentVideo => "🎬 Video ready",
        Text::SentAudio => "🎧 MP3 ready",
        Text::NoUrl => "Send link or song name",
        Text::Error => "❌ Error",
        Text::NothingFound => "❌ Nothing found",
        Text::ResultsHeader => "🎵 Songs found:",
        Text::SearchNotFound => "❌ Search not found.",
        Text::ListExpired => "❌ The list is outdated, search again",
        Text::InvalidChoice => "❌ Invalid choice",
        Text::NextPage => "➡️ Next",
        Text::AdminTitle => "📊 ADMIN PANEL",
        Text::AdminUsers => "👥 Total users",
        Text::AdminVideos => "🎬 Total videos",
        Text::AdminMp3 => "🎧 Total MP3",
        Text::AdminToday => "📅 Today",
        Text::AdminActive => "👤 Active",
        Text::AdminUptime => "⏱ Uptime",
        Text::AdminHours => "h",
        Text::AdminMinutes => "min",
        Text::AdminJobs => "⚙️ Downloads (running / queued)",
    }
}
