use std::path::PathBuf;
use thiserror::Error;

use crate::types::SemanticType;

#[derive(Debug, Error)]
pub enum SpecializeError {
    /// Language identifier absent from the type-mapping table
    #[error("unknown language '{language}' in type-mapping table")]
    UnknownLanguage { language: String },

    /// Semantic type has no spelling for the language
    #[error("type '{ty}' has no spelling for language '{language}'")]
    UnmappedType { language: String, ty: SemanticType },

    #[error("unknown specialization language: {language}")]
    UnsupportedLanguage { language: String },

    #[error("cannot read '{}': {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {message}", .path.display())]
    TemplateSlot { path: PathBuf, message: String },

    #[error("extern '{ename}' declares {anames} argument names but {atypes} argument types")]
    ArityMismatch {
        ename: String,
        anames: usize,
        atypes: usize,
    },

    #[error("invalid manifest '{}': {message}", .path.display())]
    Manifest { path: PathBuf, message: String },
}

impl SpecializeError {
    pub fn template_slot(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        SpecializeError::TemplateSlot {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn manifest(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        SpecializeError::Manifest {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// True for the lookup family: unknown language or unmapped type.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            SpecializeError::UnknownLanguage { .. } | SpecializeError::UnmappedType { .. }
        )
    }
}

pub type SpecResult<T> = Result<T, SpecializeError>;
