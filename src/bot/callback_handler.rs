//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::{ApiError, RequestError};
use tracing::{debug, error, warn};

// Import localization
use crate::localization::{t_args_lang, t_lang};

use crate::db::RecipeRepository;
use crate::errors::StoreError;
use crate::selection::{SelectionStore, UserKey};

use super::callback_data::CallbackAction;
use super::ui_builder::{create_ingredients_keyboard, create_recipes_keyboard, format_recipe_details};
use super::Reply;

/// What the transport should do in answer to one callback query
#[derive(Debug, Clone)]
pub enum CallbackOutcome {
    /// Replace the pressed message in place, then acknowledge silently
    Edit(Reply),
    /// Leave the message alone and show an alert
    Alert(String),
    /// Acknowledge without any visible effect
    Silent,
}

/// Decide the outcome of a decoded callback for the invoking user
pub async fn route_callback(
    action: CallbackAction,
    user: UserKey,
    repo: &dyn RecipeRepository,
    selections: &SelectionStore,
    language_code: Option<&str>,
) -> CallbackOutcome {
    match action {
        CallbackAction::ToggleIngredient(name) => {
            toggle_ingredient(&name, user, repo, selections, language_code).await
        }
        CallbackAction::Search(owner) => {
            if owner != user {
                debug!(user_id = user, owner = owner, "Search pressed on another user's picker");
            }
            search_recipes(user, repo, selections, language_code).await
        }
        CallbackAction::OpenRecipe(id) => open_recipe(&id, repo, language_code).await,
        CallbackAction::Unknown(raw) => {
            warn!(user_id = user, data = %raw, "Unknown callback data");
            CallbackOutcome::Silent
        }
    }
}

async fn toggle_ingredient(
    name: &str,
    user: UserKey,
    repo: &dyn RecipeRepository,
    selections: &SelectionStore,
    language_code: Option<&str>,
) -> CallbackOutcome {
    // The toggle only lands once the picker can be re-rendered to show it
    let ingredients = match repo.list_distinct_base_ingredients().await {
        Ok(ingredients) => ingredients,
        Err(e) => {
            error!(user_id = user, ingredient = %name, error = %e, "Failed to list ingredients for toggle");
            return CallbackOutcome::Alert(t_lang("ingredients-error", language_code));
        }
    };

    selections.toggle(user, name).await;

    let selected = selections.selected(user).await;
    CallbackOutcome::Edit(
        Reply::text(t_lang("ingredients-title", language_code)).with_keyboard(
            create_ingredients_keyboard(&ingredients, &selected, user, language_code),
        ),
    )
}

async fn search_recipes(
    user: UserKey,
    repo: &dyn RecipeRepository,
    selections: &SelectionStore,
    language_code: Option<&str>,
) -> CallbackOutcome {
    let selected = selections.selected(user).await;
    if selected.is_empty() {
        return CallbackOutcome::Alert(t_lang("search-empty-selection", language_code));
    }

    match repo.find_by_ingredients(&selected).await {
        Ok(recipes) if recipes.is_empty() => {
            CallbackOutcome::Edit(Reply::text(t_lang("search-no-matches", language_code)))
        }
        Ok(recipes) => {
            let count = recipes.len().to_string();
            CallbackOutcome::Edit(
                Reply::text(t_args_lang("search-results", &[("count", &count)], language_code))
                    .with_keyboard(create_recipes_keyboard(&recipes)),
            )
        }
        Err(e) => {
            error!(user_id = user, selected = ?selected, error = %e, "Ingredient search failed");
            CallbackOutcome::Alert(t_lang("search-error", language_code))
        }
    }
}

async fn open_recipe(
    id: &str,
    repo: &dyn RecipeRepository,
    language_code: Option<&str>,
) -> CallbackOutcome {
    match repo.get_by_id(id).await {
        Ok(recipe) => CallbackOutcome::Edit(
            Reply::text(format_recipe_details(&recipe, language_code)).html(),
        ),
        Err(e @ StoreError::InvalidId(_)) => {
            warn!(error = %e, "Invalid recipe id in callback");
            CallbackOutcome::Alert(t_lang("recipe-invalid-id", language_code))
        }
        Err(e @ StoreError::NotFound(_)) => {
            warn!(error = %e, "Recipe from callback no longer exists");
            CallbackOutcome::Alert(t_lang("recipe-not-found", language_code))
        }
        Err(e) => {
            error!(recipe_id = %id, error = %e, "Failed to load recipe");
            CallbackOutcome::Alert(t_lang("recipe-error", language_code))
        }
    }
}

/// Handle callback queries from inline keyboards.
///
/// Every query is answered exactly once, whether or not the edit succeeds.
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    repo: Arc<dyn RecipeRepository>,
    selections: Arc<SelectionStore>,
) -> Result<()> {
    let user = q.from.id.0;
    let data = q.data.as_deref().unwrap_or_default();
    let language_code = q.from.language_code.as_deref();
    debug!(user_id = user, data = %data, "Received callback query");

    let action = CallbackAction::parse(data);
    let outcome = route_callback(action, user, repo.as_ref(), &selections, language_code).await;

    match outcome {
        CallbackOutcome::Edit(reply) => {
            if let Some(msg) = &q.message {
                let mut request = bot.edit_message_text(msg.chat().id, msg.id(), reply.text);
                if let Some(keyboard) = reply.keyboard {
                    request = request.reply_markup(keyboard);
                }
                if let Some(parse_mode) = reply.parse_mode {
                    request = request.parse_mode(parse_mode);
                }

                match request.await {
                    Ok(_) => (),
                    Err(RequestError::Api(ApiError::MessageNotModified)) => {
                        debug!(user_id = user, "Message already up to date");
                    }
                    Err(e) => error!(user_id = user, error = %e, "Failed to edit message"),
                }
            } else {
                debug!(user_id = user, "Callback without an accessible message, nothing to edit");
            }
            bot.answer_callback_query(q.id.clone()).await?;
        }
        CallbackOutcome::Alert(text) => {
            bot.answer_callback_query(q.id.clone())
                .text(text)
                .show_alert(true)
                .await?;
        }
        CallbackOutcome::Silent => {
            bot.answer_callback_query(q.id.clone()).await?;
        }
    }

    Ok(())
}
