//! Template resolvers.
//!
//! A [`TemplateResolver`] maps a content path to template source. Engines keep
//! an ordered list of resolvers and ask each in turn; the first one that
//! returns source wins.
//!
//! Three resolvers are provided:
//!
//! | Resolver | Source |
//! |----------|--------|
//! | [`InlineResolver`] | Templates registered in memory |
//! | [`FileResolver`] | Files under a directory |
//! | [`ResourceContextResolver`] | Resources of the serving application |
//!
//! File and resource resolvers accept a prefix and suffix, so a content path of
//! `orders/list` with prefix `/WEB-INF/templates/` and suffix `.html` reads
//! `/WEB-INF/templates/orders/list.html`.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crate::registry::{DirResourceContext, ResourceContext};

/// Maps content paths to template source.
pub trait TemplateResolver: Send + Sync {
    /// Identifies this resolver in listings and error messages.
    fn name(&self) -> String;

    /// Returns the template source for `path`, or `None` if this resolver
    /// has no such template.
    fn resolve(&self, path: &str) -> io::Result<Option<String>>;
}

impl fmt::Debug for dyn TemplateResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TemplateResolver").field(&self.name()).finish()
    }
}

/// Prefix and suffix applied to content paths before lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathAffixes {
    prefix: String,
    suffix: String,
}

impl PathAffixes {
    /// Creates affixes; empty strings leave paths unchanged.
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// Applies the affixes to `path`.
    ///
    /// The suffix is not appended twice if `path` already ends with it.
    pub fn apply(&self, path: &str) -> String {
        let mut full = String::with_capacity(self.prefix.len() + path.len() + self.suffix.len());
        full.push_str(&self.prefix);
        if self.prefix.ends_with('/') {
            full.push_str(path.trim_start_matches('/'));
        } else {
            full.push_str(path);
        }
        if !self.suffix.is_empty() && !path.ends_with(&self.suffix) {
            full.push_str(&self.suffix);
        }
        full
    }
}

/// Resolves templates registered in memory.
///
/// Lookups are exact on the content path, with or without a leading `/`.
#[derive(Debug, Clone, Default)]
pub struct InlineResolver {
    templates: HashMap<String, String>,
}

impl InlineResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `source` under `path`.
    pub fn with_template(mut self, path: impl AsRef<str>, source: impl Into<String>) -> Self {
        self.add(path, source);
        self
    }

    /// Registers `source` under `path`, replacing any previous template.
    pub fn add(&mut self, path: impl AsRef<str>, source: impl Into<String>) {
        self.templates
            .insert(normalize(path.as_ref()).to_string(), source.into());
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if no templates are registered.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateResolver for InlineResolver {
    fn name(&self) -> String {
        "inline".to_string()
    }

    fn resolve(&self, path: &str) -> io::Result<Option<String>> {
        Ok(self.templates.get(normalize(path)).cloned())
    }
}

fn normalize(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Resolves templates from files under a directory.
///
/// Paths escaping the directory are never read.
#[derive(Debug, Clone)]
pub struct FileResolver {
    dir: DirResourceContext,
    affixes: PathAffixes,
}

impl FileResolver {
    /// Creates a resolver reading from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            dir: DirResourceContext::new(root),
            affixes: PathAffixes::default(),
        }
    }

    /// Sets the prefix and suffix applied to content paths.
    pub fn with_affixes(mut self, affixes: PathAffixes) -> Self {
        self.affixes = affixes;
        self
    }
}

impl TemplateResolver for FileResolver {
    fn name(&self) -> String {
        format!("file:{}", self.dir.root().display())
    }

    fn resolve(&self, path: &str) -> io::Result<Option<String>> {
        self.dir.read(&self.affixes.apply(path))
    }
}

/// Resolves templates from the serving application's resource context.
///
/// This is the resolver that can only be created after the host has started,
/// because the resource context does not exist before then.
#[derive(Clone)]
pub struct ResourceContextResolver {
    context: Arc<dyn ResourceContext>,
    affixes: PathAffixes,
}

impl ResourceContextResolver {
    /// Creates a resolver bound to `context`.
    pub fn new(context: Arc<dyn ResourceContext>) -> Self {
        Self {
            context,
            affixes: PathAffixes::default(),
        }
    }

    /// Sets the prefix and suffix applied to content paths.
    pub fn with_affixes(mut self, affixes: PathAffixes) -> Self {
        self.affixes = affixes;
        self
    }
}

impl TemplateResolver for ResourceContextResolver {
    fn name(&self) -> String {
        format!("resource:{}", self.context.label())
    }

    fn resolve(&self, path: &str) -> io::Result<Option<String>> {
        self.context.read(&self.affixes.apply(path))
    }
}

impl fmt::Debug for ResourceContextResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceContextResolver")
            .field("context", &self.context.label())
            .field("affixes", &self.affixes)
            .finish()
    }
}
