// SPDX-License-Identifier: MIT

//! Application session: settings plus the supported language table

use crate::forge::config::Settings;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Language the model writes in; no translation is needed for it
pub const DEFAULT_LANGUAGE: &str = "en";

static SUPPORTED_LANGUAGES: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        ("en", "english"),
        ("ja", "japanese"),
        ("fr", "french"),
        ("hi", "hindi"),
        ("kn", "kannada"),
        ("te", "telugu"),
        ("zh", "chinese"),
    ])
});

/// Long-lived, read-only session shared by every request
#[derive(Debug, Clone)]
pub struct Session {
    settings: Settings,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Language name for a supported code, `None` otherwise
    pub fn get_language_name(&self, code: &str) -> Option<&'static str> {
        SUPPORTED_LANGUAGES.get(code).copied()
    }

    /// The code → name table
    pub fn supported_languages(&self) -> &'static BTreeMap<&'static str, &'static str> {
        &SUPPORTED_LANGUAGES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let settings = Settings::from_lookup(|key| match key {
            "MODEL_NAME" => Some("gpt-4o-mini".to_string()),
            "MODEL_PROVIDER" => Some("openai".to_string()),
            "AI_API_KEY" => Some("sk-test".to_string()),
            _ => None,
        })
        .unwrap();
        Session::new(settings)
    }

    #[test]
    fn test_language_lookup() {
        let session = session();
        assert_eq!(session.get_language_name("en"), Some("english"));
        assert_eq!(session.get_language_name("fr"), Some("french"));
        assert_eq!(session.get_language_name("kn"), Some("kannada"));
        assert_eq!(session.get_language_name("xx"), None);
        assert_eq!(session.get_language_name(""), None);
        // Codes are case-sensitive
        assert_eq!(session.get_language_name("FR"), None);
    }

    #[test]
    fn test_supported_table() {
        let session = session();
        let codes: Vec<&str> = session.supported_languages().keys().copied().collect();
        assert_eq!(codes, vec!["en", "fr", "hi", "ja", "kn", "te", "zh"]);
        assert!(session
            .supported_languages()
            .contains_key(DEFAULT_LANGUAGE));
    }
}
