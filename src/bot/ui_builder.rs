//! UI Builder module for creating keyboards and formatting messages

use std::collections::BTreeSet;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::html;
use tracing::warn;

// Import localization
use crate::localization::t_lang;

use crate::models::Recipe;
use crate::selection::UserKey;

use super::callback_data::{CallbackAction, MAX_CALLBACK_DATA_BYTES};

pub const BUTTONS_PER_ROW: usize = 2;

/// Prefix of an ingredient button that is currently selected
pub const SELECTED_MARK: &str = "✅ ";

/// Lay out `(label, token)` pairs two per row; an odd count leaves a single
/// button on the last row
pub fn create_two_column_keyboard<I, L>(items: I) -> InlineKeyboardMarkup
where
    I: IntoIterator<Item = (L, String)>,
    L: Into<String>,
{
    let buttons: Vec<InlineKeyboardButton> = items
        .into_iter()
        .map(|(label, token)| InlineKeyboardButton::callback(label, token))
        .collect();

    InlineKeyboardMarkup::new(buttons.chunks(BUTTONS_PER_ROW).map(|row| row.to_vec()))
}

/// Create inline keyboard listing recipes by name
pub fn create_recipes_keyboard(recipes: &[Recipe]) -> InlineKeyboardMarkup {
    create_two_column_keyboard(recipes.iter().map(|recipe| {
        (
            recipe.name.clone(),
            CallbackAction::OpenRecipe(recipe.id_hex()).encode(),
        )
    }))
}

/// Create the ingredient picker keyboard for `user`.
///
/// Selected ingredients carry a checkmark. The search button always sits alone
/// on the last row.
pub fn create_ingredients_keyboard(
    ingredients: &[String],
    selected: &BTreeSet<String>,
    user: UserKey,
    language_code: Option<&str>,
) -> InlineKeyboardMarkup {
    let items = ingredients.iter().filter_map(|name| {
        let token = CallbackAction::ToggleIngredient(name.clone()).encode();
        if token.len() > MAX_CALLBACK_DATA_BYTES {
            warn!(ingredient = %name, bytes = token.len(), "Ingredient name too long for a callback button, skipping");
            return None;
        }

        let label = if selected.contains(name) {
            format!("{SELECTED_MARK}{name}")
        } else {
            name.clone()
        };
        Some((label, token))
    });

    create_two_column_keyboard(items).append_row(vec![InlineKeyboardButton::callback(
        t_lang("ingredients-search-button", language_code),
        CallbackAction::Search(user).encode(),
    )])
}

/// Format a recipe for the detail view (HTML parse mode)
pub fn format_recipe_details(recipe: &Recipe, language_code: Option<&str>) -> String {
    let grams = t_lang("unit-grams", language_code);

    format!(
        "<b>{name}</b>\n\n\
         🍽 <b>{ingredients_title}</b>:\n{base}\n\n\
         🧂 <b>{extra_title}</b>:\n{extra}\n\n\
         🔥 <b>{procedure_title}</b>:\n{procedure}\n\n\
         ⚡ <b>{nutrition_title}</b>:\n\
         {calories_label}: {calories} {kcal}\n\
         {proteins_label}: {proteins:.1} {grams}\n\
         {fats_label}: {fats:.1} {grams}\n\
         {carbs_label}: {carbs:.1} {grams}",
        name = html::escape(&recipe.name),
        ingredients_title = t_lang("recipe-ingredients", language_code),
        base = html::escape(&recipe.base_ingredients.join(", ")),
        extra_title = t_lang("recipe-extra-ingredients", language_code),
        extra = html::escape(&recipe.extra_ingredients.join(", ")),
        procedure_title = t_lang("recipe-procedure", language_code),
        procedure = html::escape(&recipe.procedure),
        nutrition_title = t_lang("recipe-nutrition", language_code),
        calories_label = t_lang("recipe-calories", language_code),
        calories = recipe.nutrition.calories,
        kcal = t_lang("unit-kcal", language_code),
        proteins_label = t_lang("recipe-proteins", language_code),
        proteins = recipe.nutrition.proteins,
        fats_label = t_lang("recipe-fats", language_code),
        fats = recipe.nutrition.fats,
        carbs_label = t_lang("recipe-carbs", language_code),
        carbs = recipe.nutrition.carbs,
    )
}
