//! Message Handler module for bot commands and plain text messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info};

// Import localization
use crate::localization::t_lang;

use crate::db::RecipeRepository;
use crate::selection::{SelectionStore, UserKey};

// Import UI builder functions
use super::ui_builder::{create_ingredients_keyboard, create_recipes_keyboard};
use super::Reply;

/// Commands published to Telegram
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    Start,
    Help,
    Recipes,
    Ingredients,
}

/// Command names paired with the catalogue key of their description
const COMMAND_DESCRIPTIONS: &[(&str, &str)] = &[
    ("start", "command-start"),
    ("help", "command-help"),
    ("recipes", "command-recipes"),
    ("ingredients", "command-ingredients"),
];

/// Command menu with descriptions in the user's language
pub fn localized_commands(language_code: Option<&str>) -> Vec<BotCommand> {
    COMMAND_DESCRIPTIONS
        .iter()
        .map(|(command, key)| BotCommand::new(*command, t_lang(key, language_code)))
        .collect()
}

/// Static welcome text for `/start`
pub fn welcome_reply(language_code: Option<&str>) -> Reply {
    Reply::text(t_lang("welcome", language_code))
}

/// Welcome text followed by the command list for `/help`
pub fn help_reply(language_code: Option<&str>) -> Reply {
    let commands: Vec<String> = localized_commands(language_code)
        .into_iter()
        .map(|c| format!("/{} - {}", c.command, c.description))
        .collect();

    Reply::text(format!(
        "{}\n\n{}\n{}",
        t_lang("welcome", language_code),
        t_lang("help-commands", language_code),
        commands.join("\n")
    ))
}

/// Every recipe as a keyboard, or a plain notice when the store is empty
pub async fn recipes_reply(repo: &dyn RecipeRepository, language_code: Option<&str>) -> Reply {
    match repo.list_all().await {
        Ok(recipes) if recipes.is_empty() => Reply::text(t_lang("recipes-empty", language_code)),
        Ok(recipes) => Reply::text(t_lang("recipes-title", language_code))
            .with_keyboard(create_recipes_keyboard(&recipes)),
        Err(e) => {
            error!(error = %e, "Failed to list recipes");
            Reply::text(t_lang("recipes-error", language_code))
        }
    }
}

/// Open the ingredient picker with a fresh, all-unselected state for `user`
pub async fn ingredients_reply(
    repo: &dyn RecipeRepository,
    selections: &SelectionStore,
    user: UserKey,
    language_code: Option<&str>,
) -> Reply {
    let ingredients = match repo.list_distinct_base_ingredients().await {
        Ok(ingredients) => ingredients,
        Err(e) => {
            error!(user_id = user, error = %e, "Failed to list ingredients");
            return Reply::text(t_lang("ingredients-error", language_code));
        }
    };

    selections.reset(user, &ingredients).await;

    if ingredients.is_empty() {
        return Reply::text(t_lang("ingredients-empty", language_code));
    }

    let selected = selections.selected(user).await;
    Reply::text(t_lang("ingredients-title", language_code)).with_keyboard(
        create_ingredients_keyboard(&ingredients, &selected, user, language_code),
    )
}

/// Extract the sender's Telegram language code
fn language_code(msg: &Message) -> Option<&str> {
    msg.from
        .as_ref()
        .and_then(|user| user.language_code.as_deref())
}

pub(crate) async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> Result<()> {
    let mut request = bot.send_message(chat_id, reply.text);
    if let Some(keyboard) = reply.keyboard {
        request = request.reply_markup(keyboard);
    }
    if let Some(parse_mode) = reply.parse_mode {
        request = request.parse_mode(parse_mode);
    }
    request.await?;
    Ok(())
}

/// Handle a parsed bot command
pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    repo: Arc<dyn RecipeRepository>,
    selections: Arc<SelectionStore>,
) -> Result<()> {
    let language_code = language_code(&msg);
    info!(chat_id = %msg.chat.id, command = ?cmd, "Received command");

    let reply = match cmd {
        Command::Start => welcome_reply(language_code),
        Command::Help => help_reply(language_code),
        Command::Recipes => recipes_reply(repo.as_ref(), language_code).await,
        Command::Ingredients => {
            let Some(user) = msg.from.as_ref() else {
                debug!(chat_id = %msg.chat.id, "Ignoring /ingredients without a sender");
                return Ok(());
            };
            ingredients_reply(repo.as_ref(), &selections, user.id.0, language_code).await
        }
    };

    send_reply(&bot, msg.chat.id, reply).await
}

/// Handle any non-command message with a pointer to /help
pub async fn text_handler(bot: Bot, msg: Message) -> Result<()> {
    debug!(chat_id = %msg.chat.id, "Received non-command message");
    send_reply(&bot, msg.chat.id, Reply::text(t_lang("text-hint", language_code(&msg)))).await
}
