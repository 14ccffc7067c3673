pub mod error;
pub mod extern_decl;
pub mod language;
pub mod logging;
pub mod specializer;
pub mod template;
pub mod types;

pub use error::{SpecResult, SpecializeError};
pub use extern_decl::Extern;
pub use language::{get_specializer, type_spelling, JoinStyle, LanguageRegistry, TargetLanguage};
pub use specializer::{Specialize, Specializer};
pub use types::SemanticType;
