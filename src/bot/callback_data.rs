//! Callback token encoding for inline keyboard buttons
//!
//! A token is a literal prefix tag followed by a payload. The prefixes are
//! disjoint (none is a prefix of another), so a token decodes to exactly one
//! action regardless of its payload.

use crate::selection::UserKey;

pub const INGREDIENT_PREFIX: &str = "ingr_";
pub const SEARCH_PREFIX: &str = "search_";
pub const RECIPE_PREFIX: &str = "recipe_";

/// Telegram rejects buttons whose callback data exceeds this many bytes
pub const MAX_CALLBACK_DATA_BYTES: usize = 64;

/// Action carried by an inline button
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// Flip one ingredient in the invoking user's picker
    ToggleIngredient(String),
    /// Run the ingredient search; the payload names the user the picker was rendered for
    Search(UserKey),
    /// Show the recipe with this hex id
    OpenRecipe(String),
    /// Anything else, kept verbatim for logging
    Unknown(String),
}

impl CallbackAction {
    /// Decode a raw token once at the transport boundary.
    ///
    /// Prefixes are tested in a fixed order: ingredient toggle, search, recipe.
    pub fn parse(data: &str) -> Self {
        if let Some(name) = data.strip_prefix(INGREDIENT_PREFIX) {
            if !name.is_empty() {
                return CallbackAction::ToggleIngredient(name.to_string());
            }
        } else if let Some(user) = data.strip_prefix(SEARCH_PREFIX) {
            if let Ok(user) = user.parse() {
                return CallbackAction::Search(user);
            }
        } else if let Some(id) = data.strip_prefix(RECIPE_PREFIX) {
            return CallbackAction::OpenRecipe(id.to_string());
        }

        CallbackAction::Unknown(data.to_string())
    }

    /// Encode back into the token placed on a button
    pub fn encode(&self) -> String {
        match self {
            CallbackAction::ToggleIngredient(name) => format!("{INGREDIENT_PREFIX}{name}"),
            CallbackAction::Search(user) => format!("{SEARCH_PREFIX}{user}"),
            CallbackAction::OpenRecipe(id) => format!("{RECIPE_PREFIX}{id}"),
            CallbackAction::Unknown(raw) => raw.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_each_prefix() {
        assert_eq!(
            CallbackAction::parse("ingr_морковь"),
            CallbackAction::ToggleIngredient("морковь".to_string())
        );
        assert_eq!(CallbackAction::parse("search_12345"), CallbackAction::Search(12345));
        assert_eq!(
            CallbackAction::parse("recipe_65a1f0c2e4b0a1b2c3d4e5f6"),
            CallbackAction::OpenRecipe("65a1f0c2e4b0a1b2c3d4e5f6".to_string())
        );
    }

    #[test]
    fn test_payload_that_looks_like_another_prefix() {
        assert_eq!(
            CallbackAction::parse("ingr_recipe_x"),
            CallbackAction::ToggleIngredient("recipe_x".to_string())
        );
        assert_eq!(
            CallbackAction::parse("recipe_ingr_x"),
            CallbackAction::OpenRecipe("ingr_x".to_string())
        );
    }

    #[test]
    fn test_unknown_tokens() {
        for raw in ["", "confirm", "ingr_", "search_", "search_abc", "search_-5", "Recipe_1"] {
            assert_eq!(CallbackAction::parse(raw), CallbackAction::Unknown(raw.to_string()));
        }
    }

    #[test]
    fn test_encode_matches_wire_format() {
        assert_eq!(CallbackAction::Search(99).encode(), "search_99");
        assert_eq!(
            CallbackAction::ToggleIngredient("milk".to_string()).encode(),
            "ingr_milk"
        );
        let token = CallbackAction::OpenRecipe("abc".to_string()).encode();
        assert_eq!(token, "recipe_abc");
        assert_eq!(CallbackAction::parse(&token), CallbackAction::OpenRecipe("abc".to_string()));
    }
}
