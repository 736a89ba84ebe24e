//! # Recipe Telegram Bot
//!
//! A Telegram bot for browsing recipes stored in MongoDB and filtering them by
//! the ingredients a user has at home, picked from an inline keyboard.

pub mod bot;
pub mod config;
pub mod db;
pub mod errors;
pub mod localization;
pub mod models;
pub mod selection;
