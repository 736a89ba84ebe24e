use anyhow::Result;
use std::process::ExitCode;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use recipe_bot::bot::BotSession;
use recipe_bot::config::{redact_uri, Config, LogFormat};
use recipe_bot::db::{connect_mongo, MongoRecipeRepo, RecipeRepository};
use recipe_bot::localization::init_localization;
use recipe_bot::selection::SelectionStore;

const DEFAULT_LOG_FILTER: &str = "recipe_bot=info,teloxide=warn";

fn init_logging(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.with_target(false).init(),
    }
}

/// Resolve on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn run(config: Config) -> Result<()> {
    init_localization(&config.default_language)?;

    info!(uri = %redact_uri(&config.mongo_uri), "Connecting to MongoDB");
    let client = connect_mongo(&config.mongo_uri, config.connect_timeout).await?;

    let repo: Arc<dyn RecipeRepository> = Arc::new(MongoRecipeRepo::new(
        &client,
        &config.database_name,
        &config.collection_name,
        config.store_timeout,
    ));
    let selections = Arc::new(SelectionStore::new());

    info!("Initializing bot");
    let bot = Bot::new(&config.bot_token);
    let me = bot.get_me().await?;
    info!(username = %me.username(), "Authorized with Telegram");

    let running = BotSession::new(bot, repo, selections).start().await?;

    shutdown_signal().await;
    info!("Shutting down");

    let stopped = running.stop().await;
    client.shutdown().await;
    stopped
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::from_env();
    init_logging(config.as_ref().map(|c| c.log_format).unwrap_or_default());

    info!("Starting recipe bot");

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load config");
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Bot terminated with an error");
            ExitCode::FAILURE
        }
    }
}
