//! Language catalog: which languages are in scope, how their codes map onto
//! the backend's codes, and which treebanks each one offers.
//!
//! A [`Catalog`] is validated once when it is built, so a missing table entry
//! shows up at startup instead of on the first request for that language.

mod tables;

use serde::Serialize;
use std::fmt;

use crate::error::{Error, Result};

pub use tables::CatalogTables;

/// A fully resolved (language, treebank) selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedModel {
    /// Toolkit code, e.g. `lat`
    pub language: String,
    /// Backend language name, e.g. `Latin`
    pub language_name: String,
    /// Backend code, e.g. `la`
    pub backend_code: String,
    pub treebank: String,
}

impl fmt::Display for ResolvedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{})", self.language, self.backend_code, self.treebank)
    }
}

/// Listing entry for one supported language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageInfo {
    pub code: String,
    pub name: String,
    pub backend_code: String,
    pub default_treebank: String,
    pub treebanks: Vec<String>,
}

/// Validated, immutable lookup tables.
#[derive(Debug, Clone)]
pub struct Catalog {
    tables: CatalogTables,
}

impl Catalog {
    /// The built-in catalog.
    ///
    /// The shipped tables are covered by tests, so a failure here would be a
    /// build defect; it is still reported as an error rather than a panic.
    pub fn builtin() -> Result<Self> {
        Self::from_tables(CatalogTables::builtin())
    }

    /// Check a table set for completeness and wrap it.
    pub fn from_tables(tables: CatalogTables) -> Result<Self> {
        if tables.language_names.is_empty() {
            return Err(Error::CatalogInconsistency(
                "catalog defines no languages".to_string(),
            ));
        }

        for (code, name) in &tables.language_names {
            let backend_code = tables.backend_codes.get(name).ok_or_else(|| {
                Error::CatalogInconsistency(format!(
                    "no backend code for language name '{name}' (toolkit code '{code}')"
                ))
            })?;

            let treebanks = tables
                .treebanks
                .get(backend_code)
                .filter(|banks| !banks.is_empty())
                .ok_or_else(|| {
                    Error::CatalogInconsistency(format!(
                        "no treebanks listed for backend code '{backend_code}'"
                    ))
                })?;

            let default = tables.default_treebanks.get(backend_code).ok_or_else(|| {
                Error::CatalogInconsistency(format!(
                    "no default treebank for backend code '{backend_code}'"
                ))
            })?;

            if !treebanks.contains(default) {
                return Err(Error::CatalogInconsistency(format!(
                    "default treebank '{default}' for '{backend_code}' is not among {treebanks:?}"
                )));
            }
        }

        Ok(Self { tables })
    }

    pub fn tables(&self) -> &CatalogTables {
        &self.tables
    }

    pub fn is_supported(&self, language: &str) -> bool {
        self.tables.language_names.contains_key(language.trim())
    }

    /// Resolve a toolkit language code and optional treebank.
    ///
    /// An unknown language always yields [`Error::UnknownLanguage`]. A treebank
    /// that is not listed for the language yields
    /// [`Error::UnimplementedLanguage`]. An absent or blank treebank falls
    /// back to the language's default.
    pub fn resolve(&self, language: &str, treebank: Option<&str>) -> Result<ResolvedModel> {
        let language = language.trim();
        let language_name = self
            .tables
            .language_names
            .get(language)
            .ok_or_else(|| Error::UnknownLanguage(language.to_string()))?;

        let backend_code = self.backend_code_for(language, language_name)?;

        let treebank = match treebank.map(str::trim).filter(|t| !t.is_empty()) {
            Some(requested) => {
                let valid = self
                    .tables
                    .treebanks
                    .get(backend_code)
                    .map(|banks| banks.iter().any(|b| b == requested))
                    .unwrap_or(false);
                if !valid {
                    return Err(Error::UnimplementedLanguage {
                        language: language.to_string(),
                        treebank: requested.to_string(),
                    });
                }
                requested.to_string()
            }
            None => self
                .tables
                .default_treebanks
                .get(backend_code)
                .cloned()
                .ok_or_else(|| {
                    Error::CatalogInconsistency(format!(
                        "no default treebank for backend code '{backend_code}'"
                    ))
                })?,
        };

        Ok(ResolvedModel {
            language: language.to_string(),
            language_name: language_name.clone(),
            backend_code: backend_code.clone(),
            treebank,
        })
    }

    pub fn default_treebank(&self, language: &str) -> Result<String> {
        self.resolve(language, None).map(|r| r.treebank)
    }

    pub fn treebanks(&self, language: &str) -> Result<Vec<String>> {
        let resolved = self.resolve(language, None)?;
        Ok(self
            .tables
            .treebanks
            .get(&resolved.backend_code)
            .cloned()
            .unwrap_or_default())
    }

    /// All supported languages, ordered by toolkit code.
    pub fn languages(&self) -> Vec<LanguageInfo> {
        self.tables
            .language_names
            .keys()
            .filter_map(|code| {
                let resolved = self.resolve(code, None).ok()?;
                let treebanks = self
                    .tables
                    .treebanks
                    .get(&resolved.backend_code)
                    .cloned()
                    .unwrap_or_default();
                Some(LanguageInfo {
                    code: resolved.language,
                    name: resolved.language_name,
                    backend_code: resolved.backend_code,
                    default_treebank: resolved.treebank,
                    treebanks,
                })
            })
            .collect()
    }

    fn backend_code_for(&self, language: &str, language_name: &str) -> Result<&String> {
        self.tables.backend_codes.get(language_name).ok_or_else(|| {
            Error::CatalogInconsistency(format!(
                "map of toolkit codes to backend codes is out of sync for '{language}' ({language_name})"
            ))
        })
    }
}
