mod bot;
mod config;
mod downloader;
mod errors;
mod i18n;
mod search;
mod session;
mod stats;
mod transport;
mod utils;
#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::sync::Arc;
use clap::Parser;
use log::info;
use crate::bot::{BotService, TelegramTransport};
use crate::downloader::job::JobContext;
use crate::downloader::manager::DownloadManager;
use crate::downloader::ytdlp::YtDlpClient;
use crate::search::SearchPager;
use crate::session::SessionStore;
use crate::stats::StatsLedger;

#[derive(Parser, Debug)]
#[command(name = "saving-bot", version, about = "Telegram video/MP3 saving bot")]
struct Args {
    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides `stats_path` from the config
    #[arg(long)]
    stats_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    info!("Starting saving bot");

    let mut config = match config::BotConfig::load(args.config.as_deref()) {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) if args.config.is_some() => return Err(e.into()),
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            let mut config = config::BotConfig::default();
            config.apply_env_token();
            config
        }
    };
    if let Some(stats_file) = args.stats_file {
        config.stats_path = stats_file;
    }

    let bot = bot::telegram::build_bot(&config)?;

    // A stats file that exists but does not parse stops start-up.
    let stats = Arc::new(StatsLedger::load(&config.stats_path).await?);
    info!("Stats ledger at {:?}", stats.path());

    tokio::fs::create_dir_all(&config.tmp_root).await?;
    info!("Workspaces under {:?}", config.tmp_root);

    let ytdlp = Arc::new(YtDlpClient::new(config.ytdlp_path.clone()));
    let transport = Arc::new(TelegramTransport::new(bot.clone()));
    let sessions = SessionStore::new(config.default_language);

    let downloads = DownloadManager::new(
        JobContext {
            transport: transport.clone(),
            extractor: ytdlp.clone(),
            stats: stats.clone(),
            sessions: sessions.clone(),
        },
        config.max_concurrent_downloads,
    );
    let pager = SearchPager::with_limits(ytdlp, config.page_size, config.search_limit);

    let service = Arc::new(BotService::new(
        transport,
        sessions,
        pager,
        downloads,
        stats,
        config.admin_user_id,
        config.tmp_root.clone(),
    ));

    bot::telegram::run(bot, service).await;
    info!("Saving bot stopped");
    Ok(())
}
