use serde::{Deserialize, Serialize};

/// A country as listed by `/countries`. `name` may already be localized by
/// the server; `original_name` is the untranslated source name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    pub name: String,
    #[serde(default, alias = "originalName", skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
}

impl Country {
    /// Display name, preferring a server translation, then `lookup` on the
    /// `countries.<key>` translation key, then the server name.
    pub fn display_name<F>(&self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        translate_country_name(&self.name, self.original_name.as_deref(), lookup)
    }
}

/// Translation key for a country name: `countries.` followed by the
/// lowercased ASCII alphanumerics of the name.
pub fn translation_key(name: &str) -> String {
    let normalized: String = name
        .chars()
        .filter_map(|c| {
            let lower = c.to_ascii_lowercase();
            lower.is_ascii_alphanumeric().then_some(lower)
        })
        .collect();
    format!("countries.{normalized}")
}

pub fn translate_country_name<F>(name: &str, original_name: Option<&str>, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if name.is_empty() {
        return String::new();
    }

    let original = original_name.filter(|o| !o.is_empty());
    if let Some(original) = original {
        if original != name {
            // Server already translated it.
            return name.to_string();
        }
    }

    let source = original.unwrap_or(name);
    let key = translation_key(source);
    match lookup(&key) {
        Some(translated) if translated != key && translated != source => translated,
        _ => name.to_string(),
    }
}
