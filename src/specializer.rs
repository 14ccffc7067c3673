use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{SpecResult, SpecializeError};
use crate::extern_decl::Extern;
use crate::language::{self, TargetLanguage};
use crate::template::{FuncTemplate, FuncText, TemplateCache};

/// Renders externs into one source string in a target language.
pub trait Specialize {
    fn specialize(&self, externs: &[Extern], prefix: bool) -> SpecResult<String>;
}

/// Specializer for one (language, template directory) pair.
#[derive(Debug)]
pub struct Specializer {
    language: TargetLanguage,
    cache: TemplateCache,
    func: OnceCell<FuncTemplate>,
    strict_arity: bool,
}

impl Specializer {
    pub fn new(language: &TargetLanguage, sourcecode_path: impl Into<PathBuf>) -> Self {
        Self {
            language: language.clone(),
            cache: TemplateCache::new(sourcecode_path),
            func: OnceCell::new(),
            strict_arity: true,
        }
    }

    /// Specializer for a built-in language, or `None` if unsupported.
    pub fn for_language(name: &str, sourcecode_path: impl Into<PathBuf>) -> Option<Self> {
        language::get_specializer(name).map(|lang| Self::new(lang, sourcecode_path))
    }

    /// When disabled, mismatched `anames`/`atypes` are zipped to the
    /// shorter length instead of failing.
    pub fn with_strict_arity(mut self, strict: bool) -> Self {
        self.strict_arity = strict;
        self
    }

    pub fn language(&self) -> &TargetLanguage {
        &self.language
    }

    pub fn load(&self, filename: &str) -> SpecResult<Arc<str>> {
        self.cache.load(filename)
    }

    /// Function template, parsed and slot-checked on first use.
    pub fn func_template(&self) -> SpecResult<&FuncTemplate> {
        self.func
            .get_or_try_init(|| self.cache.load_func(&self.language.func_filename))
    }

    pub fn template_reads(&self) -> usize {
        self.cache.reads()
    }

    fn render_args(&self, ext: &Extern) -> SpecResult<String> {
        if !ext.has_matching_arity() {
            if self.strict_arity {
                return Err(SpecializeError::ArityMismatch {
                    ename: ext.ename.clone(),
                    anames: ext.anames.len(),
                    atypes: ext.atypes.len(),
                });
            }
            tracing::warn!(
                ename = %ext.ename,
                anames = ext.anames.len(),
                atypes = ext.atypes.len(),
                "argument names and types differ in length, truncating"
            );
        }

        let args = ext
            .anames
            .iter()
            .zip(&ext.atypes)
            .map(|(name, ty)| -> SpecResult<String> {
                let spelling = self.language.spelling(*ty)?;
                Ok(self.language.join_style.format_arg(name, spelling))
            })
            .collect::<SpecResult<Vec<_>>>()?;

        Ok(args.join(", "))
    }
}

impl Specialize for Specializer {
    fn specialize(&self, externs: &[Extern], prefix: bool) -> SpecResult<String> {
        let mut source = String::new();
        if prefix {
            source.push_str(&self.cache.load(&self.language.prefix_filename)?);
        }

        let tmpl = self.func_template()?;
        for ext in externs {
            let args = self.render_args(ext)?;
            let text = FuncText {
                rtype: self.language.spelling(ext.rtype)?,
                args: &args,
                ename: &ext.ename,
                fbody: &ext.doc,
            };
            tmpl.render_into(&mut source, &text);
            tracing::debug!(language = %self.language.name, ename = %ext.ename, "specialized extern");
        }

        Ok(source)
    }
}
