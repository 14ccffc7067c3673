// Function templates spell slots as %(name)s; %% is a literal percent.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{SpecResult, SpecializeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    ReturnType,
    Args,
    Name,
    Body,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::ReturnType, Slot::Args, Slot::Name, Slot::Body];

    pub fn key(&self) -> &'static str {
        match self {
            Slot::ReturnType => "rtype",
            Slot::Args => "args",
            Slot::Name => "ename",
            Slot::Body => "fbody",
        }
    }

    fn from_key(key: &str) -> Option<Slot> {
        Slot::ALL.into_iter().find(|slot| slot.key() == key)
    }
}

/// Values substituted into a function template for one extern.
#[derive(Debug, Clone, Copy)]
pub struct FuncText<'a> {
    pub rtype: &'a str,
    pub args: &'a str,
    pub ename: &'a str,
    pub fbody: &'a str,
}

impl<'a> FuncText<'a> {
    fn get(&self, slot: Slot) -> &'a str {
        match slot {
            Slot::ReturnType => self.rtype,
            Slot::Args => self.args,
            Slot::Name => self.ename,
            Slot::Body => self.fbody,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Text(String),
    Slot(Slot),
}

/// A parsed function template holding exactly the four expected slots.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncTemplate {
    segments: Vec<Segment>,
}

impl FuncTemplate {
    /// Parses `text`, failing if a slot is missing or unknown, or if a `%`
    /// starts anything other than `%%` or `%(name)s`. `path` is used for
    /// diagnostics only.
    pub fn parse(path: &Path, text: &str) -> SpecResult<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = text;

        while let Some(pos) = rest.find('%') {
            literal.push_str(&rest[..pos]);
            let offset = text.len() - rest.len() + pos;
            let directive = &rest[pos + 1..];

            if let Some(after) = directive.strip_prefix('%') {
                literal.push('%');
                rest = after;
                continue;
            }

            let inner = directive.strip_prefix('(').ok_or_else(|| {
                SpecializeError::template_slot(
                    path,
                    format!("stray '%' at byte {}; write '%%' for a literal percent", offset),
                )
            })?;
            let close = inner.find(')').ok_or_else(|| {
                SpecializeError::template_slot(path, format!("unterminated slot at byte {}", offset))
            })?;
            let key = &inner[..close];
            let after = inner[close + 1..].strip_prefix('s').ok_or_else(|| {
                SpecializeError::template_slot(
                    path,
                    format!("slot '{}' at byte {} must be written %({})s", key, offset, key),
                )
            })?;
            let slot = Slot::from_key(key).ok_or_else(|| {
                SpecializeError::template_slot(path, format!("unknown slot '{}'", key))
            })?;

            if !literal.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Slot(slot));
            rest = after;
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Text(literal));
        }

        let missing: Vec<&str> = Slot::ALL
            .iter()
            .filter(|slot| !segments.contains(&Segment::Slot(**slot)))
            .map(Slot::key)
            .collect();
        if !missing.is_empty() {
            return Err(SpecializeError::template_slot(
                path,
                format!("function template is missing slot(s): {}", missing.join(", ")),
            ));
        }

        Ok(Self { segments })
    }

    pub fn render_into(&self, out: &mut String, text: &FuncText) {
        for segment in &self.segments {
            match segment {
                Segment::Text(s) => out.push_str(s),
                Segment::Slot(slot) => out.push_str(text.get(*slot)),
            }
        }
    }

    pub fn render(&self, text: &FuncText) -> String {
        let mut out = String::new();
        self.render_into(&mut out, text);
        out
    }
}

// The lock is held across the first read of a filename, so each file is read
// at most once per cache. Failed reads are not cached.
#[derive(Debug)]
pub struct TemplateCache {
    dir: PathBuf,
    sources: Mutex<HashMap<String, Arc<str>>>,
    reads: AtomicUsize,
}

impl TemplateCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sources: Mutex::new(HashMap::new()),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    pub fn load(&self, filename: &str) -> SpecResult<Arc<str>> {
        let mut sources = self.sources.lock();
        if let Some(cached) = sources.get(filename) {
            tracing::trace!(filename, "template cache hit");
            return Ok(Arc::clone(cached));
        }

        let path = self.path_of(filename);
        let content = fs::read_to_string(&path)
            .map_err(|source| SpecializeError::FileAccess { path: path.clone(), source })?;
        self.reads.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(path = %path.display(), bytes = content.len(), "loaded template");

        let content: Arc<str> = Arc::from(content);
        sources.insert(filename.to_string(), Arc::clone(&content));
        Ok(content)
    }

    pub fn load_func(&self, filename: &str) -> SpecResult<FuncTemplate> {
        let source = self.load(filename)?;
        FuncTemplate::parse(&self.path_of(filename), &source)
    }

    /// Number of files actually read from storage.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}
