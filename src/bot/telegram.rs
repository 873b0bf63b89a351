use std::path::Path;
use std::sync::Arc;
use async_trait::async_trait;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId as TgMessageId};
use teloxide::utils::command::BotCommands;
use crate::bot::service::BotService;
use crate::config::BotConfig;
use crate::errors::{AppError, Result};
use crate::transport::{self, Keyboard, Transport};

#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Commands:")]
pub enum Command {
    #[command(description = "choose language")]
    Start,
    #[command(description = "usage statistics")]
    Admin,
}

/// Bot client whose HTTP requests time out after `read_timeout_secs`.
pub fn build_bot(config: &BotConfig) -> Result<Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(config.read_timeout())
        .build()?;
    Ok(Bot::with_client(config.token()?, client))
}

/// Telegram Bot API as the outbound transport.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.payload.clone()))
            .collect::<Vec<_>>()
    }))
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_text(&self, chat_id: transport::ChatId, text: &str) -> Result<()> {
        self.bot.send_message(ChatId(chat_id), text).await?;
        Ok(())
    }

    async fn send_keyboard(&self, chat_id: transport::ChatId, text: &str, keyboard: &Keyboard) -> Result<()> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .reply_markup(markup(keyboard))
            .await?;
        Ok(())
    }

    async fn edit_text(
        &self,
        chat_id: transport::ChatId,
        message_id: transport::MessageId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<()> {
        let request = self.bot.edit_message_text(ChatId(chat_id), TgMessageId(message_id), text);
        match keyboard {
            Some(keyboard) => request.reply_markup(markup(keyboard)).await?,
            None => request.await?,
        };
        Ok(())
    }

    async fn send_audio(&self, chat_id: transport::ChatId, file: &Path) -> Result<()> {
        log::info!("📤 [UPLOAD] Audio {:?} to {}", file, chat_id);
        self.bot.send_audio(ChatId(chat_id), InputFile::file(file.to_path_buf())).await?;
        Ok(())
    }

    async fn send_video(&self, chat_id: transport::ChatId, file: &Path) -> Result<()> {
        log::info!("📤 [UPLOAD] Video {:?} to {}", file, chat_id);
        self.bot.send_video(ChatId(chat_id), InputFile::file(file.to_path_buf())).await?;
        Ok(())
    }

    async fn send_document(&self, chat_id: transport::ChatId, file: &Path) -> Result<()> {
        log::info!("📤 [UPLOAD] File {:?} to {}", file, chat_id);
        self.bot.send_document(ChatId(chat_id), InputFile::file(file.to_path_buf())).await?;
        Ok(())
    }
}

fn schema() -> UpdateHandler<AppError> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_callback_query().endpoint(handle_callback_query))
}

async fn handle_command(msg: Message, cmd: Command, service: Arc<BotService>) -> Result<()> {
    let chat_id = msg.chat.id.0;
    match cmd {
        Command::Start => service.handle_start(chat_id).await,
        Command::Admin => {
            let Some(user) = msg.from() else {
                return Ok(());
            };
            service.handle_admin(user.id.0, chat_id).await
        }
    }
}

/// Plain text only; stickers, media and service messages are dropped.
async fn handle_message(msg: Message, service: Arc<BotService>) -> Result<()> {
    let (Some(user), Some(text)) = (msg.from(), msg.text()) else {
        return Ok(());
    };
    service.handle_text(user.id.0, msg.chat.id.0, text).await
}

async fn handle_callback_query(bot: Bot, q: CallbackQuery, service: Arc<BotService>) -> Result<()> {
    // Acknowledge first so the client stops its spinner whatever happens next.
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        log::warn!("⚠️ [CALLBACK] Could not answer {}: {}", q.id, e);
    }

    let (Some(message), Some(data)) = (q.message.as_ref(), q.data.as_deref()) else {
        return Ok(());
    };
    if let Some(handle) = service.handle_callback(q.from.id.0, message.chat.id.0, message.id.0, data).await? {
        log::info!("🚀 [CALLBACK] Dispatched job {}", handle.job_id());
    }
    Ok(())
}

/// Runs the long-polling dispatcher until Ctrl-C.
pub async fn run(bot: Bot, service: Arc<BotService>) {
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        log::warn!("⚠️ Could not register bot commands: {}", e);
    }

    log::info!("🤖 Bot is polling for updates");
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![service])
        .error_handler(LoggingErrorHandler::with_custom_text("An error from the update handler"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::keyboards::quality_keyboard;

    #[test]
    fn keyboard_converts_row_by_row() {
        let markup = markup(&quality_keyboard());
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[1].len(), 2);
        assert_eq!(markup.inline_keyboard[0][0].text, "360p");
    }

    #[test]
    fn bot_needs_a_token() {
        let mut config = BotConfig::default();
        assert!(matches!(build_bot(&config), Err(AppError::Validation(_))));
        config.bot_token = Some("123:abc".to_string());
        assert!(build_bot(&config).is_ok());
    }

    #[test]
    fn commands_parse() {
        assert!(matches!(Command::parse("/start", "saving_bot"), Ok(Command::Start)));
        assert!(matches!(Command::parse("/admin", "saving_bot"), Ok(Command::Admin)));
        assert!(Command::parse("/help", "saving_bot").is_err());
    }
}
