//! Bot session: dispatcher wiring and start/stop lifecycle

use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::dispatching::{ShutdownToken, UpdateHandler};
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::db::RecipeRepository;
use crate::localization::{get_localization_manager, supported_languages};
use crate::selection::SelectionStore;

use super::message_handler::localized_commands;
use super::{callback_handler, command_handler, text_handler, Command};

/// Update routing: commands, other messages, then every callback query
pub fn schema() -> UpdateHandler<anyhow::Error> {
    let message_handler = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(dptree::endpoint(text_handler));

    let callback_query_handler = Update::filter_callback_query().endpoint(callback_handler);

    dptree::entry()
        .branch(message_handler)
        .branch(callback_query_handler)
}

/// Everything the handlers need, ready to be started against Telegram
pub struct BotSession {
    bot: Bot,
    repo: Arc<dyn RecipeRepository>,
    selections: Arc<SelectionStore>,
}

impl BotSession {
    pub fn new(bot: Bot, repo: Arc<dyn RecipeRepository>, selections: Arc<SelectionStore>) -> Self {
        Self {
            bot,
            repo,
            selections,
        }
    }

    /// Publish the command menu: one per catalogue language, plus the default-language
    /// menu for clients whose language has no catalogue
    pub async fn register_commands(&self) -> Result<()> {
        let default_language = get_localization_manager().default_language();
        self.bot
            .set_my_commands(localized_commands(Some(default_language)))
            .await
            .context("Failed to register bot commands")?;

        for language in supported_languages() {
            self.bot
                .set_my_commands(localized_commands(Some(language)))
                .language_code(language)
                .await
                .with_context(|| format!("Failed to register bot commands for {language}"))?;
        }

        info!(default_language = %default_language, "Bot commands registered");
        Ok(())
    }

    /// Register commands and start long polling on a background task
    pub async fn start(self) -> Result<RunningSession> {
        self.register_commands().await?;

        let mut dispatcher = Dispatcher::builder(self.bot, schema())
            .dependencies(dptree::deps![self.repo, self.selections])
            .default_handler(|upd| async move {
                debug!(update_id = ?upd.id, "Unhandled update");
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .build();

        let shutdown = dispatcher.shutdown_token();
        let task = tokio::spawn(async move {
            dispatcher.dispatch().await;
        });

        info!("Bot started and listening for updates");
        Ok(RunningSession { shutdown, task })
    }
}

/// Handle to a started session
pub struct RunningSession {
    shutdown: ShutdownToken,
    task: JoinHandle<()>,
}

impl RunningSession {
    /// Stop polling and wait for in-flight updates to finish
    pub async fn stop(self) -> Result<()> {
        info!("Stopping bot");
        match self.shutdown.shutdown() {
            Ok(done) => done.await,
            // Dispatcher has not begun polling yet or is already stopped
            Err(e) => {
                warn!(error = %e, "Dispatcher was idle at shutdown");
                self.task.abort();
            }
        }

        match self.task.await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => debug!("Dispatcher task cancelled"),
            Err(e) => return Err(e).context("Dispatcher task panicked"),
        }

        info!("Bot stopped");
        Ok(())
    }
}
