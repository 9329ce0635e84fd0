//! Language type: a catalog entry that has already been validated.
//!
//! A `Language` can only be obtained from [`LanguageCatalog`](crate::i18n::LanguageCatalog),
//! so holding one proves the display name was a catalog key when it was
//! resolved. The run keeps this handle instead of the raw user input.

use serde::Serialize;
use std::fmt;

/// A resolved translation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Language {
    /// Display name (e.g., "French")
    name: &'static str,

    /// Translation service code (e.g., "fr")
    code: &'static str,
}

impl Language {
    pub(crate) fn new(name: &'static str, code: &'static str) -> Self {
        Self { name, code }
    }

    /// Get the display name shown in the language picker.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Get the code sent to the translation and speech services.
    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}
