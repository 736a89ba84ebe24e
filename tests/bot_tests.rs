use recipe_bot::bot::message_handler::{help_reply, ingredients_reply, recipes_reply, welcome_reply};
use recipe_bot::bot::ui_builder::{create_recipes_keyboard, create_two_column_keyboard};
use recipe_bot::db::InMemoryRecipeRepo;
use recipe_bot::localization::t_lang;
use recipe_bot::models::Recipe;
use recipe_bot::selection::SelectionStore;
use std::collections::HashSet;
use teloxide::types::{InlineKeyboardButtonKind, InlineKeyboardMarkup};

#[cfg(test)]
mod tests {
    use super::*;

    fn all_tokens(keyboard: &InlineKeyboardMarkup) -> Vec<String> {
        keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .map(|button| match &button.kind {
                InlineKeyboardButtonKind::CallbackData(data) => data.clone(),
                other => panic!("unexpected button kind {other:?}"),
            })
            .collect()
    }

    /// Test the row layout for every size up to a couple of screens of buttons
    #[test]
    fn test_two_column_layout_row_counts() {
        for n in 0..=25usize {
            let keyboard = create_two_column_keyboard((0..n).map(|i| (format!("item {i}"), format!("tok_{i}"))));
            let rows = &keyboard.inline_keyboard;

            assert_eq!(rows.len(), n.div_ceil(2), "row count for {n} items");
            for (index, row) in rows.iter().enumerate() {
                let is_last = index + 1 == rows.len();
                let expected = if is_last && n % 2 == 1 { 1 } else { 2 };
                assert_eq!(row.len(), expected, "row {index} for {n} items");
            }

            let tokens = all_tokens(&keyboard);
            let unique: HashSet<&String> = tokens.iter().collect();
            assert_eq!(unique.len(), n, "tokens collide for {n} items");
        }
    }

    /// Test that recipe buttons carry the recipe id and keep store order
    #[test]
    fn test_recipes_keyboard_tokens() {
        let recipes = vec![
            Recipe::new("Borscht"),
            Recipe::new("Pelmeni"),
            Recipe::new("Olivier"),
        ];
        let keyboard = create_recipes_keyboard(&recipes);

        let labels: Vec<&str> = keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .map(|button| button.text.as_str())
            .collect();
        assert_eq!(labels, vec!["Borscht", "Pelmeni", "Olivier"]);

        let expected: Vec<String> = recipes
            .iter()
            .map(|recipe| format!("recipe_{}", recipe.id_hex()))
            .collect();
        assert_eq!(all_tokens(&keyboard), expected);
    }

    /// Test start command response contains expected content
    #[test]
    fn test_start_command_response_contains_expected_content() {
        let reply = welcome_reply(Some("en"));
        assert!(reply.text.contains("Welcome"));
        assert!(reply.text.contains("/recipes"));
        assert!(reply.keyboard.is_none());
    }

    /// Test help command lists every registered command
    #[test]
    fn test_help_command_response_contains_expected_content() {
        let reply = help_reply(Some("en"));
        for command in ["/start", "/help", "/recipes", "/ingredients"] {
            assert!(reply.text.contains(command), "help lacks {command}");
        }
    }

    /// Test that /help is entirely in the user's language
    #[test]
    fn test_help_command_is_not_mixed_language() {
        let english = help_reply(Some("en"));
        assert!(english.text.contains("Available commands:"));
        assert!(english.text.contains("/ingredients - find a recipe by ingredients"));
        assert!(
            !english.text.chars().any(|c| ('\u{0400}'..='\u{04FF}').contains(&c)),
            "English help contains Cyrillic: {}",
            english.text
        );

        let russian = help_reply(Some("ru"));
        assert!(russian.text.contains("/recipes - все рецепты"));
    }

    /// Test that an empty store produces the notice without a keyboard
    #[tokio::test]
    async fn test_recipes_command_with_empty_store() {
        let repo = InMemoryRecipeRepo::default();

        let reply = recipes_reply(&repo, Some("en")).await;

        assert_eq!(reply.text, t_lang("recipes-empty", Some("en")));
        assert!(reply.keyboard.is_none());
    }

    #[tokio::test]
    async fn test_recipes_command_lists_every_recipe() {
        let repo = InMemoryRecipeRepo::new(vec![
            Recipe::new("Borscht"),
            Recipe::new("Pelmeni"),
            Recipe::new("Olivier"),
        ]);

        let reply = recipes_reply(&repo, Some("ru")).await;

        assert_eq!(reply.text, "📋 Выберите рецепт:");
        let keyboard = reply.keyboard.expect("recipes keyboard");
        assert_eq!(all_tokens(&keyboard).len(), 3);
        assert_eq!(keyboard.inline_keyboard.len(), 2);
    }

    /// Test that the picker is rendered for the invoking user with nothing ticked
    #[tokio::test]
    async fn test_ingredients_command_opens_fresh_picker() {
        let repo = InMemoryRecipeRepo::new(vec![
            Recipe::new("Omelette").with_base_ingredients(["eggs", "milk"]),
            Recipe::new("Crepes").with_base_ingredients(["eggs", "flour", "milk"]),
        ]);
        let selections = SelectionStore::new();
        selections.toggle(31, "milk").await;

        let reply = ingredients_reply(&repo, &selections, 31, Some("en")).await;

        let keyboard = reply.keyboard.expect("picker keyboard");
        assert_eq!(
            all_tokens(&keyboard),
            vec!["ingr_eggs", "ingr_flour", "ingr_milk", "search_31"]
        );
        assert!(keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .all(|button| !button.text.starts_with('✅')));
        assert!(selections.selected(31).await.is_empty());
    }
}
