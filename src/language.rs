use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::error::{SpecResult, SpecializeError};
use crate::types::SemanticType;

/// Process-wide read-only table of the built-in languages.
static BUILTIN: Lazy<LanguageRegistry> = Lazy::new(LanguageRegistry::builtin);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JoinStyle {
    /// `int a`
    TypeThenName,
    /// `a: int`
    NameThenType,
}

impl JoinStyle {
    pub fn format_arg(&self, name: &str, spelling: &str) -> String {
        match self {
            JoinStyle::TypeThenName => format!("{} {}", spelling, name),
            JoinStyle::NameThenType => format!("{}: {}", name, spelling),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetLanguage {
    pub name: String,
    pub type_table: BTreeMap<SemanticType, String>,
    pub prefix_filename: String,
    pub func_filename: String,
    pub join_style: JoinStyle,
}

impl TargetLanguage {
    /// Spelling of `ty` in this language, or a lookup error.
    pub fn spelling(&self, ty: SemanticType) -> SpecResult<&str> {
        self.type_table
            .get(&ty)
            .map(String::as_str)
            .ok_or_else(|| SpecializeError::UnmappedType {
                language: self.name.clone(),
                ty,
            })
    }

    fn c() -> Self {
        Self {
            name: "c".to_string(),
            type_table: table(&[
                (SemanticType::None, "void"),
                (SemanticType::Bool, "bool"),
                (SemanticType::Int, "int"),
                (SemanticType::Long, "long"),
                (SemanticType::Float, "double"),
                (SemanticType::Str, "char*"),
                (SemanticType::Unicode, "char*"),
                (SemanticType::NdArray, "py_ndarray*"),
            ]),
            prefix_filename: "inline.prefix.c".to_string(),
            func_filename: "inline.func.c".to_string(),
            join_style: JoinStyle::TypeThenName,
        }
    }

    fn chapel() -> Self {
        Self {
            name: "chapel".to_string(),
            type_table: table(&[
                (SemanticType::None, "void"),
                (SemanticType::Bool, "bool"),
                (SemanticType::Int, "int"),
                (SemanticType::Long, "int(64)"),
                (SemanticType::Float, "real(64)"),
                (SemanticType::Str, "string"),
                (SemanticType::Unicode, "string"),
                (SemanticType::NdArray, "ndarray"),
            ]),
            prefix_filename: "inline.prefix.chpl".to_string(),
            func_filename: "inline.func.chpl".to_string(),
            join_style: JoinStyle::NameThenType,
        }
    }
}

fn table(entries: &[(SemanticType, &str)]) -> BTreeMap<SemanticType, String> {
    entries
        .iter()
        .map(|(ty, spelling)| (*ty, spelling.to_string()))
        .collect()
}

// On-disk shape of a language declaration. Type-table keys stay strings
// until converted so unknown type names get a readable error.
#[derive(Debug, Deserialize)]
struct LanguageDecl {
    name: String,
    prefix_filename: String,
    func_filename: String,
    join_style: JoinStyle,
    type_table: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct LanguageFile {
    #[serde(default)]
    language: Vec<LanguageDecl>,
}

#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
    languages: HashMap<String, TargetLanguage>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the reference languages, `c` and `chapel`.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(TargetLanguage::c());
        registry.register(TargetLanguage::chapel());
        registry
    }

    /// Registers `language` under its lowercased name, replacing any
    /// previous entry of the same name.
    pub fn register(&mut self, mut language: TargetLanguage) {
        language.name = language.name.to_lowercase();
        self.languages.insert(language.name.clone(), language);
    }

    pub fn get(&self, name: &str) -> Option<&TargetLanguage> {
        self.languages.get(&name.to_lowercase())
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.languages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn type_spelling(&self, language: &str, ty: SemanticType) -> SpecResult<&str> {
        self.get(language)
            .ok_or_else(|| SpecializeError::UnknownLanguage {
                language: language.to_string(),
            })?
            .spelling(ty)
    }

    /// Registers every `[[language]]` table found in `source`.
    pub fn extend_from_toml(&mut self, path: &Path, source: &str) -> SpecResult<usize> {
        let file: LanguageFile =
            toml::from_str(source).map_err(|e| SpecializeError::manifest(path, e))?;
        let count = file.language.len();

        for decl in file.language {
            let mut type_table = BTreeMap::new();
            for (key, spelling) in decl.type_table {
                let ty = key
                    .parse::<SemanticType>()
                    .map_err(|e| SpecializeError::manifest(path, e))?;
                type_table.insert(ty, spelling);
            }
            tracing::debug!(language = %decl.name, "registering target language");
            self.register(TargetLanguage {
                name: decl.name,
                type_table,
                prefix_filename: decl.prefix_filename,
                func_filename: decl.func_filename,
                join_style: decl.join_style,
            });
        }

        Ok(count)
    }

    pub fn load_toml(&mut self, path: &Path) -> SpecResult<usize> {
        let source = fs::read_to_string(path).map_err(|source| SpecializeError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        self.extend_from_toml(path, &source)
    }
}

/// Spelling of `ty` in the built-in `language` (matched case-insensitively).
pub fn type_spelling(language: &str, ty: SemanticType) -> SpecResult<&'static str> {
    BUILTIN.type_spelling(language, ty)
}

/// Looks up a built-in language; unsupported names yield `None`.
pub fn get_specializer(name: &str) -> Option<&'static TargetLanguage> {
    BUILTIN.get(name)
}

pub fn builtin_registry() -> &'static LanguageRegistry {
    &BUILTIN
}
