//! Language catalog: the fixed table of translation targets.
//!
//! Maps the human-readable name shown in the language picker to the code the
//! translation service expects. The built-in catalog is initialised once with
//! `OnceLock` and never mutated afterwards.

use crate::error::{Error, Result};
use crate::i18n::Language;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Built-in translation targets as `(display name, service code)`.
///
/// Names are unique; codes are not ("Filipino" and "Tagalog" both map to `tl`).
const BUILTIN_LANGUAGES: &[(&str, &str)] = &[
    ("Arabic", "ar"),
    ("Bengali", "bn"),
    ("Chinese (Simplified)", "zh-CN"),
    ("Chinese (Traditional)", "zh-TW"),
    ("Dutch", "nl"),
    ("English", "en"),
    ("Filipino", "tl"),
    ("French", "fr"),
    ("German", "de"),
    ("Gujarati", "gu"),
    ("Hindi", "hi"),
    ("Italian", "it"),
    ("Japanese", "ja"),
    ("Kannada", "kn"),
    ("Korean", "ko"),
    ("Marathi", "mr"),
    ("Portuguese", "pt"),
    ("Punjabi", "pa"),
    ("Russian", "ru"),
    ("Spanish", "es"),
    ("Tagalog", "tl"),
    ("Tamil", "ta"),
    ("Telugu", "te"),
    ("Turkish", "tr"),
    ("Urdu", "ur"),
];

/// Immutable name → code table.
#[derive(Debug, Clone)]
pub struct LanguageCatalog {
    // BTreeMap keeps enumeration in ascending name order for free
    entries: BTreeMap<&'static str, &'static str>,
}

/// Built-in catalog instance (initialized lazily)
static BUILTIN: OnceLock<LanguageCatalog> = OnceLock::new();

impl LanguageCatalog {
    /// Get the built-in catalog.
    pub fn builtin() -> &'static LanguageCatalog {
        BUILTIN.get_or_init(|| {
            Self::from_table(BUILTIN_LANGUAGES).expect("built-in language table has unique names")
        })
    }

    /// Build a catalog from a literal `(name, code)` table.
    ///
    /// # Errors
    /// Fails if a name appears twice or if a name or code is blank.
    pub fn from_table(table: &'static [(&'static str, &'static str)]) -> anyhow::Result<Self> {
        let mut entries = BTreeMap::new();
        for &(name, code) in table {
            if name.trim().is_empty() || code.trim().is_empty() {
                anyhow::bail!("Language table contains a blank entry: ({:?}, {:?})", name, code);
            }
            if entries.insert(name, code).is_some() {
                anyhow::bail!("Language '{}' appears more than once in the table", name);
            }
        }
        Ok(Self { entries })
    }

    /// Look up the service code for a display name.
    ///
    /// # Errors
    /// `Error::UnknownLanguage` if `name` is not a key.
    pub fn code_for(&self, name: &str) -> Result<&'static str> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownLanguage(name.to_string()))
    }

    /// Resolve a display name into a validated [`Language`].
    pub fn resolve(&self, name: &str) -> Result<Language> {
        self.entries
            .get_key_value(name)
            .map(|(&name, &code)| Language::new(name, code))
            .ok_or_else(|| Error::UnknownLanguage(name.to_string()))
    }

    /// All display names in ascending lexicographic order.
    pub fn all_names_sorted(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    /// All languages in ascending name order.
    pub fn languages(&self) -> Vec<Language> {
        self.entries
            .iter()
            .map(|(&name, &code)| Language::new(name, code))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Built-in Catalog Tests ====================

    #[test]
    fn test_builtin_returns_singleton() {
        let catalog1 = LanguageCatalog::builtin();
        let catalog2 = LanguageCatalog::builtin();

        assert!(std::ptr::eq(catalog1, catalog2));
    }

    #[test]
    fn test_builtin_contains_common_targets() {
        let catalog = LanguageCatalog::builtin();
        assert_eq!(catalog.code_for("Hindi").unwrap(), "hi");
        assert_eq!(catalog.code_for("Gujarati").unwrap(), "gu");
        assert_eq!(catalog.code_for("French").unwrap(), "fr");
        assert_eq!(catalog.code_for("German").unwrap(), "de");
        assert_eq!(catalog.code_for("Spanish").unwrap(), "es");
    }

    #[test]
    fn test_builtin_size_matches_table() {
        assert_eq!(LanguageCatalog::builtin().len(), BUILTIN_LANGUAGES.len());
        assert!(!LanguageCatalog::builtin().is_empty());
    }

    // ==================== code_for Tests ====================

    #[test]
    fn test_every_name_resolves_and_is_listed_once_in_order() {
        let catalog = LanguageCatalog::builtin();
        let names = catalog.all_names_sorted();

        for &(name, code) in BUILTIN_LANGUAGES {
            assert_eq!(catalog.code_for(name).unwrap(), code);
            assert_eq!(names.iter().filter(|n| **n == name).count(), 1);
        }
        assert!(names.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_code_for_unknown_language() {
        let result = LanguageCatalog::builtin().code_for("Klingon");
        assert!(matches!(result, Err(Error::UnknownLanguage(name)) if name == "Klingon"));
    }

    #[test]
    fn test_code_for_is_case_sensitive() {
        assert!(LanguageCatalog::builtin().code_for("french").is_err());
        assert!(LanguageCatalog::builtin().code_for("").is_err());
    }

    #[test]
    fn test_codes_need_not_be_unique() {
        let catalog = LanguageCatalog::builtin();
        assert_eq!(catalog.code_for("Filipino").unwrap(), "tl");
        assert_eq!(catalog.code_for("Tagalog").unwrap(), "tl");
    }

    // ==================== resolve Tests ====================

    #[test]
    fn test_resolve_returns_language() {
        let language = LanguageCatalog::builtin().resolve("Japanese").unwrap();
        assert_eq!(language.name(), "Japanese");
        assert_eq!(language.code(), "ja");
    }

    #[test]
    fn test_resolve_unknown() {
        assert!(LanguageCatalog::builtin().resolve("Elvish").is_err());
    }

    #[test]
    fn test_languages_follow_name_order() {
        let catalog = LanguageCatalog::builtin();
        let names: Vec<_> = catalog.languages().iter().map(|l| l.name()).collect();
        assert_eq!(names, catalog.all_names_sorted());
    }

    // ==================== from_table Tests ====================

    #[test]
    fn test_from_table_sorts_names() {
        static TABLE: &[(&str, &str)] = &[("Zulu", "zu"), ("Afrikaans", "af"), ("Maori", "mi")];
        let catalog = LanguageCatalog::from_table(TABLE).unwrap();
        assert_eq!(catalog.all_names_sorted(), vec!["Afrikaans", "Maori", "Zulu"]);
    }

    #[test]
    fn test_from_table_rejects_duplicate_names() {
        static TABLE: &[(&str, &str)] = &[("French", "fr"), ("French", "fr-CA")];
        let err = LanguageCatalog::from_table(TABLE).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_from_table_rejects_blank_entries() {
        static TABLE: &[(&str, &str)] = &[("French", "")];
        assert!(LanguageCatalog::from_table(TABLE).is_err());
    }

    #[test]
    fn test_from_table_empty() {
        let catalog = LanguageCatalog::from_table(&[]).unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.all_names_sorted().is_empty());
    }
}
