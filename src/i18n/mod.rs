//! Internationalization (i18n) support
//!
//! UI strings for the supported locales. Built-in tables can
//! be overridden per key with `languages/<lang>.yml` files in the site dir.

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Locales with built-in UI strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    PtBr,
    En,
}

impl Locale {
    /// Map a language tag to a locale; unknown tags fall back to English
    pub fn from_language(language: &str) -> Self {
        let lang = language.to_ascii_lowercase().replace('_', "-");
        if lang == "pt" || lang.starts_with("pt-") {
            Locale::PtBr
        } else {
            Locale::En
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Locale::PtBr => "pt-BR",
            Locale::En => "en",
        }
    }

    /// chrono locale used for month and weekday names
    pub fn chrono_locale(self) -> chrono::Locale {
        match self {
            Locale::PtBr => chrono::Locale::pt_BR,
            Locale::En => chrono::Locale::en_US,
        }
    }

    fn builtin_strings(self) -> &'static str {
        match self {
            Locale::PtBr => PT_BR_STRINGS,
            Locale::En => EN_STRINGS,
        }
    }
}

const PT_BR_STRINGS: &str = r#"
load_more: Carregar mais posts
loading: Carregando...
exit_preview: Sair do modo Preview
edited: "* editado em {date}, às {hour}:{minute}"
reading_time: "{minutes} min"
previous_post: Post anterior
next_post: Próximo post
not_found: Post não encontrado
source_unavailable: Não foi possível carregar o conteúdo. Tente novamente.
"#;

const EN_STRINGS: &str = r#"
load_more: Load more posts
loading: Loading...
exit_preview: Exit preview mode
edited: "* edited on {date}, at {hour}:{minute}"
reading_time: "{minutes} min"
previous_post: Previous post
next_post: Next post
not_found: Post not found
source_unavailable: The content could not be loaded. Please try again.
"#;

/// Internationalization handler
#[derive(Debug, Clone)]
pub struct I18n {
    locale: Locale,
    /// key -> translation, built-ins merged with overrides
    translations: HashMap<String, String>,
}

impl I18n {
    /// Create a handler with the built-in strings of a language
    pub fn new(language: &str) -> Self {
        let locale = Locale::from_language(language);
        let mut translations = HashMap::new();
        // Built-in tables are static and always parse
        if let Ok(data) = serde_yaml::from_str::<HashMap<String, serde_yaml::Value>>(
            Locale::En.builtin_strings(),
        ) {
            flatten_translations(&data, "", &mut translations);
        }
        if locale != Locale::En {
            if let Ok(data) = serde_yaml::from_str::<HashMap<String, serde_yaml::Value>>(
                locale.builtin_strings(),
            ) {
                flatten_translations(&data, "", &mut translations);
            }
        }
        Self {
            locale,
            translations,
        }
    }

    /// Load `<dir>/<locale tag>.yml` overrides if present
    pub fn load_overrides<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        for ext in ["yml", "yaml"] {
            let path = dir.join(format!("{}.{}", self.locale.tag(), ext));
            if !path.is_file() {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            match serde_yaml::from_str::<HashMap<String, serde_yaml::Value>>(&content) {
                Ok(data) => {
                    flatten_translations(&data, "", &mut self.translations);
                    tracing::debug!("Loaded language file: {:?}", path);
                }
                Err(e) => {
                    tracing::warn!("Failed to parse language file {:?}: {}", path, e);
                }
            }
        }
        Ok(())
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Get a translation by key; unknown keys are returned as-is
    pub fn get(&self, key: &str) -> String {
        self.translations
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Get a translation and substitute `{name}` placeholders
    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> String {
        let mut text = self.get(key);
        for (name, value) in args {
            text = text.replace(&format!("{{{}}}", name), value);
        }
        text
    }

    /// All translations as a flat map, for template contexts
    pub fn all(&self) -> &HashMap<String, String> {
        &self.translations
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new("pt-BR")
    }
}

/// Flatten nested YAML into dot-notation keys
fn flatten_translations(
    data: &HashMap<String, serde_yaml::Value>,
    prefix: &str,
    result: &mut HashMap<String, String>,
) {
    for (key, value) in data {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            serde_yaml::Value::String(s) => {
                result.insert(full_key, s.clone());
            }
            serde_yaml::Value::Number(n) => {
                result.insert(full_key, n.to_string());
            }
            serde_yaml::Value::Bool(b) => {
                result.insert(full_key, b.to_string());
            }
            serde_yaml::Value::Mapping(map) => {
                let nested: HashMap<String, serde_yaml::Value> = map
                    .iter()
                    .filter_map(|(k, v)| Some((k.as_str()?.to_string(), v.clone())))
                    .collect();
                flatten_translations(&nested, &full_key, result);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_from_language() {
        assert_eq!(Locale::from_language("pt-BR"), Locale::PtBr);
        assert_eq!(Locale::from_language("pt_br"), Locale::PtBr);
        assert_eq!(Locale::from_language("en-US"), Locale::En);
        assert_eq!(Locale::from_language("fr"), Locale::En);
    }

    #[test]
    fn test_builtin_translations() {
        let i18n = I18n::new("pt-BR");
        assert_eq!(i18n.get("load_more"), "Carregar mais posts");
        assert_eq!(i18n.get("unknown"), "unknown");

        let en = I18n::new("en");
        assert_eq!(en.get("loading"), "Loading...");
    }

    #[test]
    fn test_format_placeholders() {
        let i18n = I18n::new("en");
        assert_eq!(
            i18n.format("edited", &[("date", "25 Mar 2021"), ("hour", "19"), ("minute", "05")]),
            "* edited on 25 Mar 2021, at 19:05"
        );
    }

    #[test]
    fn test_overrides() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("pt-BR.yml"),
            "load_more: Mais posts\nmenu:\n  home: Início\n",
        )
        .unwrap();

        let mut i18n = I18n::new("pt-BR");
        i18n.load_overrides(dir.path()).unwrap();
        assert_eq!(i18n.get("load_more"), "Mais posts");
        assert_eq!(i18n.get("menu.home"), "Início");
        assert_eq!(i18n.get("loading"), "Carregando...");
    }
}
