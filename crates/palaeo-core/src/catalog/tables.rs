//! Static language and treebank tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Toolkit code (ISO 639-3) to the language name used by the backend.
const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("grc", "Ancient_Greek"),
    ("lat", "Latin"),
    ("chu", "Old_Church_Slavonic"),
    ("fro", "Old_French"),
    ("got", "Gothic"),
];

/// Backend language name to backend language code.
const BACKEND_CODES: &[(&str, &str)] = &[
    ("Ancient_Greek", "grc"),
    ("Latin", "la"),
    ("Old_Church_Slavonic", "cu"),
    ("Old_French", "fro"),
    ("Gothic", "got"),
];

/// Treebanks with published models, per backend code.
const TREEBANKS: &[(&str, &[&str])] = &[
    ("grc", &["proiel", "perseus"]),
    ("la", &["perseus", "proiel", "ittb"]),
    ("cu", &["proiel"]),
    ("fro", &["srcmf"]),
    ("got", &["proiel"]),
];

const DEFAULT_TREEBANKS: &[(&str, &str)] = &[
    ("grc", "proiel"),
    ("la", "ittb"),
    ("cu", "proiel"),
    ("fro", "srcmf"),
    ("got", "proiel"),
];

/// Raw lookup tables backing a [`super::Catalog`].
///
/// These are plain data and may be inconsistent; `Catalog::from_tables`
/// is what checks them against each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTables {
    /// Toolkit code -> backend language name
    #[serde(default)]
    pub language_names: BTreeMap<String, String>,

    /// Backend language name -> backend code
    #[serde(default)]
    pub backend_codes: BTreeMap<String, String>,

    /// Backend code -> valid treebanks
    #[serde(default)]
    pub treebanks: BTreeMap<String, Vec<String>>,

    /// Backend code -> treebank used when none is requested
    #[serde(default)]
    pub default_treebanks: BTreeMap<String, String>,
}

impl CatalogTables {
    /// The tables shipped with the crate.
    pub fn builtin() -> Self {
        Self {
            language_names: to_map(LANGUAGE_NAMES),
            backend_codes: to_map(BACKEND_CODES),
            treebanks: TREEBANKS
                .iter()
                .map(|(code, banks)| {
                    (
                        code.to_string(),
                        banks.iter().map(|b| b.to_string()).collect(),
                    )
                })
                .collect(),
            default_treebanks: to_map(DEFAULT_TREEBANKS),
        }
    }
}

impl Default for CatalogTables {
    fn default() -> Self {
        Self::builtin()
    }
}

fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
