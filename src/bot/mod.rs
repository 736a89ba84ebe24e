//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `callback_data`: Encodes and decodes inline button tokens
//! - `ui_builder`: Creates keyboards and formats messages
//! - `message_handler`: Handles bot commands and plain text
//! - `callback_handler`: Routes inline keyboard callback queries
//! - `session`: Wires handlers into the dispatcher and owns its lifecycle
//!
//! Handlers first compute a reply value from the store and selection state, then
//! a thin layer sends it through the Bot API. The first half is what the tests drive.

use teloxide::types::{InlineKeyboardMarkup, ParseMode};

pub mod callback_data;
pub mod callback_handler;
pub mod message_handler;
pub mod session;
pub mod ui_builder;

// Re-export main handler functions for use in the session
pub use callback_handler::{callback_handler, route_callback, CallbackOutcome};
pub use message_handler::{command_handler, text_handler, Command};
pub use session::{BotSession, RunningSession};

/// Text plus optional keyboard to send or to put in place of an existing message
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
    pub parse_mode: Option<ParseMode>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
            parse_mode: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn html(mut self) -> Self {
        self.parse_mode = Some(ParseMode::Html);
        self
    }
}
