//! # Localization Module
//!
//! User-facing text lives in Fluent catalogues under `locales/<lang>/main.ftl`.
//! The catalogues are compiled into the binary and served through concurrent
//! bundles so handlers on any runtime worker can format messages.

use anyhow::{anyhow, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::warn;
use unic_langid::LanguageIdentifier;

/// Language used when neither the user nor the configuration picks a supported one
pub const FALLBACK_LANGUAGE: &str = "ru";

const CATALOGUES: &[(&str, &str)] = &[
    ("ru", include_str!("../locales/ru/main.ftl")),
    ("en", include_str!("../locales/en/main.ftl")),
];

/// Language codes of every compiled-in catalogue
pub fn supported_languages() -> impl Iterator<Item = &'static str> {
    CATALOGUES.iter().map(|(code, _)| *code)
}

/// Localization manager for the recipe bot
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
    default_language: String,
}

impl LocalizationManager {
    /// Create a manager with every bundled catalogue loaded
    pub fn new(default_language: &str) -> Result<Self> {
        let mut bundles = HashMap::new();

        for (code, source) in CATALOGUES {
            let locale: LanguageIdentifier = code.parse()?;
            bundles.insert(code.to_string(), Self::create_bundle(locale, source)?);
        }

        let default_language = if bundles.contains_key(default_language) {
            default_language.to_string()
        } else {
            warn!(language = %default_language, fallback = FALLBACK_LANGUAGE, "Unsupported default language");
            FALLBACK_LANGUAGE.to_string()
        };

        Ok(Self {
            bundles,
            default_language,
        })
    }

    fn create_bundle(
        locale: LanguageIdentifier,
        source: &str,
    ) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);
        // Telegram renders the bidi isolation marks literally
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow!("invalid catalogue for {locale}: {errors:?}"))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("duplicate messages in catalogue for {locale}: {errors:?}"))?;

        Ok(bundle)
    }

    /// The language every unsupported or missing user language resolves to
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Resolve a Telegram `language_code` (e.g. `en-US`) to a loaded bundle key
    pub fn resolve_language(&self, language_code: Option<&str>) -> &str {
        language_code
            .map(|code| code.split(['-', '_']).next().unwrap_or(code).to_lowercase())
            .and_then(|code| self.bundles.get_key_value(&code).map(|(key, _)| key.as_str()))
            .unwrap_or(self.default_language.as_str())
    }

    /// Get a localized message
    pub fn get_message(&self, key: &str, args: Option<&FluentArgs>, language_code: Option<&str>) -> String {
        let language = self.resolve_language(language_code);
        let Some(bundle) = self.bundles.get(language) else {
            return format!("Missing translation: {key}");
        };

        let Some(pattern) = bundle.get_message(key).and_then(|msg| msg.value()) else {
            return format!("Missing translation: {key}");
        };

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, args, &mut errors);
        if !errors.is_empty() {
            warn!(key = %key, language = %language, errors = ?errors, "Errors while formatting message");
        }

        value.into_owned()
    }

    /// Get a localized message with simple string arguments
    pub fn get_message_with_args(
        &self,
        key: &str,
        args: &[(&str, &str)],
        language_code: Option<&str>,
    ) -> String {
        let mut fluent_args = FluentArgs::new();
        for (name, value) in args {
            fluent_args.set(*name, FluentValue::from(*value));
        }
        self.get_message(key, Some(&fluent_args), language_code)
    }
}

static LOCALIZATION_MANAGER: OnceLock<LocalizationManager> = OnceLock::new();

/// Initialize the global localization manager with the configured default language.
///
/// Only the first call has an effect; later calls keep the existing manager.
pub fn init_localization(default_language: &str) -> Result<()> {
    let manager = LocalizationManager::new(default_language)?;
    let _ = LOCALIZATION_MANAGER.set(manager);
    Ok(())
}

/// Get the global localization manager, building it with the fallback language if
/// `init_localization` was never called.
pub fn get_localization_manager() -> &'static LocalizationManager {
    LOCALIZATION_MANAGER.get_or_init(|| {
        LocalizationManager::new(FALLBACK_LANGUAGE).unwrap_or_else(|e| {
            // The catalogues are compiled in, so this only trips on a broken .ftl file
            panic!("bundled Fluent catalogues failed to load: {e}")
        })
    })
}

/// Get a localized message in the user's language
pub fn t_lang(key: &str, language_code: Option<&str>) -> String {
    get_localization_manager().get_message(key, None, language_code)
}

/// Get a localized message with arguments in the user's language
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language_code: Option<&str>) -> String {
    get_localization_manager().get_message_with_args(key, args, language_code)
}
