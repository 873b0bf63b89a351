pub mod callback;
pub mod keyboards;
pub mod service;
pub mod telegram;

pub use service::BotService;
pub use telegram::TelegramTransport;
