//! Translation targets offered by the page.
//!
//! # Architecture
//!
//! - `catalog`: the fixed name → service-code table and its sorted enumeration
//! - `language`: the validated `Language` handle a run carries once resolved
//!
//! # Example
//!
//! ```rust,ignore
//! use language_translator::i18n::LanguageCatalog;
//!
//! let catalog = LanguageCatalog::builtin();
//! let code = catalog.code_for("French")?; // "fr"
//! let names = catalog.all_names_sorted();
//! ```

mod catalog;
mod language;

pub use catalog::LanguageCatalog;
pub use language::Language;
