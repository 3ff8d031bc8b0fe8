use anyhow::{Context, Result};
use std::collections::HashMap;

const EMBEDDED: &[(&str, &str)] = &[
    ("en", include_str!("../../translations/en.json")),
    ("ru", include_str!("../../translations/ru.json")),
];

/// Read-only message tables, one per language.
#[derive(Debug, Clone)]
pub struct Translator {
    default_language: String,
    tables: HashMap<String, HashMap<String, String>>,
}

impl Translator {
    pub fn embedded(default_language: &str) -> Result<Self> {
        let mut tables = HashMap::new();
        for (language, raw) in EMBEDDED {
            let table: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("Failed to parse {} translations", language))?;
            tables.insert(language.to_string(), table);
        }
        Self::from_tables(default_language, tables)
    }

    pub fn from_tables(
        default_language: &str,
        tables: HashMap<String, HashMap<String, String>>,
    ) -> Result<Self> {
        if !tables.contains_key(default_language) {
            return Err(anyhow::anyhow!(
                "No translations for default language {}",
                default_language
            ));
        }
        Ok(Self {
            default_language: default_language.to_string(),
            tables,
        })
    }

    /// Template for `key`. Falls back to the default language, then to the key itself.
    pub fn get_text<'a>(&'a self, language: &str, key: &'a str) -> &'a str {
        let language = normalize_language(language);
        self.tables
            .get(language)
            .and_then(|table| table.get(key))
            .or_else(|| {
                self.tables
                    .get(&self.default_language)
                    .and_then(|table| table.get(key))
            })
            .map(String::as_str)
            .unwrap_or(key)
    }

    pub fn format(&self, language: &str, key: &str, args: &[&str]) -> String {
        fill(self.get_text(language, key), args)
    }
}

/// `en-US` and `en` share a table.
fn normalize_language(language: &str) -> &str {
    language.split(['-', '_']).next().unwrap_or(language)
}

/// Replaces each `{}` in order with the next argument. Surplus placeholders stay empty.
pub fn fill(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;

    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        if let Some(arg) = args.next() {
            out.push_str(arg);
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}
