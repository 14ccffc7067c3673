use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Host-side type categories an extern can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    None,
    Bool,
    Int,
    #[serde(alias = "wide-int")]
    Long,
    Float,
    #[serde(alias = "text")]
    Str,
    #[serde(alias = "wide-text")]
    Unicode,
    #[serde(alias = "numeric-array")]
    NdArray,
}

impl SemanticType {
    pub const ALL: [SemanticType; 8] = [
        SemanticType::None,
        SemanticType::Bool,
        SemanticType::Int,
        SemanticType::Long,
        SemanticType::Float,
        SemanticType::Str,
        SemanticType::Unicode,
        SemanticType::NdArray,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::None => "none",
            SemanticType::Bool => "bool",
            SemanticType::Int => "int",
            SemanticType::Long => "long",
            SemanticType::Float => "float",
            SemanticType::Str => "str",
            SemanticType::Unicode => "unicode",
            SemanticType::NdArray => "ndarray",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemanticType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(SemanticType::None),
            "bool" => Ok(SemanticType::Bool),
            "int" => Ok(SemanticType::Int),
            "long" | "wide-int" => Ok(SemanticType::Long),
            "float" => Ok(SemanticType::Float),
            "str" | "text" => Ok(SemanticType::Str),
            "unicode" | "wide-text" => Ok(SemanticType::Unicode),
            "ndarray" | "numeric-array" => Ok(SemanticType::NdArray),
            other => Err(format!("unknown semantic type '{}'", other)),
        }
    }
}
