use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{SpecResult, SpecializeError};
use crate::types::SemanticType;

/// A typed function declaration whose body is foreign source text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Extern {
    /// Exported symbol name, used verbatim in the generated signature
    pub ename: String,
    pub rtype: SemanticType,
    #[serde(default)]
    pub anames: Vec<String>,
    #[serde(default)]
    pub atypes: Vec<SemanticType>,
    /// Function body, spliced verbatim
    #[serde(default)]
    pub doc: String,
}

impl Extern {
    pub fn new(ename: impl Into<String>, rtype: SemanticType) -> Self {
        Self {
            ename: ename.into(),
            rtype,
            anames: Vec::new(),
            atypes: Vec::new(),
            doc: String::new(),
        }
    }

    pub fn arg(mut self, name: impl Into<String>, ty: SemanticType) -> Self {
        self.anames.push(name.into());
        self.atypes.push(ty);
        self
    }

    pub fn body(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn has_matching_arity(&self) -> bool {
        self.anames.len() == self.atypes.len()
    }
}

/// Reads a JSON array of externs.
pub fn load_manifest(path: &Path) -> SpecResult<Vec<Extern>> {
    let content = fs::read_to_string(path).map_err(|source| SpecializeError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|e| SpecializeError::manifest(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builder_keeps_args_paired() {
        let ext = Extern::new("add", SemanticType::Int)
            .arg("a", SemanticType::Int)
            .arg("b", SemanticType::Long)
            .body("return a+b;");
        assert_eq!(ext.anames, vec!["a", "b"]);
        assert_eq!(ext.atypes, vec![SemanticType::Int, SemanticType::Long]);
        assert!(ext.has_matching_arity());
    }

    #[test]
    fn test_load_manifest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"ename": "add", "rtype": "int", "anames": ["a", "b"],
                  "atypes": ["int", "int"], "doc": "return a+b;"}},
                {{"ename": "hello_caller", "rtype": "none"}}
            ]"#
        )
        .unwrap();

        let externs = load_manifest(file.path()).unwrap();
        assert_eq!(externs.len(), 2);
        assert_eq!(externs[0].doc, "return a+b;");
        assert_eq!(externs[1].rtype, SemanticType::None);
        assert!(externs[1].anames.is_empty());
    }

    #[test]
    fn test_load_manifest_errors() {
        let missing = load_manifest(Path::new("/nonexistent/externs.json")).unwrap_err();
        assert!(matches!(missing, SpecializeError::FileAccess { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"ename": "f", "rtype": "complex"}}]"#).unwrap();
        let bad = load_manifest(file.path()).unwrap_err();
        assert!(matches!(bad, SpecializeError::Manifest { .. }));
    }
}
