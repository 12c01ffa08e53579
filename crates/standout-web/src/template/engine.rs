//! Template engine abstraction.
//!
//! This module defines the [`TemplateEngine`] trait that response writers
//! render through. Writers never look inside an engine: they register
//! resolvers while it is being built, and afterwards only ask it to process a
//! content path into a sink. The default implementation is [`MiniJinjaEngine`].

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use minijinja::{Environment, Error, ErrorKind};
use parking_lot::RwLock;

use super::resolver::TemplateResolver;
use crate::context::EngineContext;
use crate::error::RenderError;

/// A template engine that resolves content paths and renders them.
///
/// Engines are mutated only while they are being assembled (through
/// `&mut self`); once shared they must support concurrent `process` calls.
pub trait TemplateEngine: Send + Sync {
    /// Appends a resolver to the end of the resolution order.
    fn add_resolver(&mut self, resolver: Arc<dyn TemplateResolver>);

    /// Names of the registered resolvers, in resolution order.
    fn resolver_names(&self) -> Vec<String>;

    /// Renders the template at `path` with `context`, writing to `out`.
    fn process(
        &self,
        path: &str,
        context: &EngineContext,
        out: &mut dyn Write,
    ) -> Result<(), RenderError>;

    /// Renders the template at `path` into a string.
    fn process_to_string(&self, path: &str, context: &EngineContext) -> Result<String, RenderError> {
        let mut buffer = Vec::new();
        self.process(path, context, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| RenderError::Serialization(e.to_string()))
    }
}

impl fmt::Debug for dyn TemplateEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TemplateEngine").field(&self.resolver_names()).finish()
    }
}

type ResolverChain = Arc<RwLock<Vec<Arc<dyn TemplateResolver>>>>;

/// MiniJinja-based template engine.
///
/// Templates are loaded through the registered resolvers, in order, the first
/// time a content path is processed. Templates whose path ends in `.html`,
/// `.htm` or `.xml` are auto-escaped.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use standout_web::{EngineContext, InlineResolver, Locale, MiniJinjaEngine, TemplateEngine};
///
/// let mut engine = MiniJinjaEngine::new();
/// engine.add_resolver(Arc::new(
///     InlineResolver::new().with_template("/hello.html", "Hello, {{ name }}!"),
/// ));
///
/// let ctx = EngineContext::new(Locale::new("en")).with_var("name", "World");
/// let output = engine.process_to_string("/hello.html", &ctx).unwrap();
/// assert_eq!(output, "Hello, World!");
/// ```
pub struct MiniJinjaEngine {
    env: Environment<'static>,
    resolvers: ResolverChain,
}

impl MiniJinjaEngine {
    /// Creates an engine with no resolvers.
    pub fn new() -> Self {
        let resolvers: ResolverChain = Arc::default();
        let mut env = Environment::new();
        let chain = Arc::clone(&resolvers);
        env.set_loader(move |name| load(&chain, name));
        Self { env, resolvers }
    }

    /// Returns a reference to the underlying MiniJinja environment.
    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    /// Returns a mutable reference to the underlying MiniJinja environment.
    ///
    /// Use this to register custom filters or functions while assembling the
    /// engine.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn load(chain: &ResolverChain, name: &str) -> Result<Option<String>, Error> {
    for resolver in chain.read().iter() {
        match resolver.resolve(name) {
            Ok(Some(source)) => {
                tracing::trace!(template = name, resolver = %resolver.name(), "template resolved");
                return Ok(Some(source));
            }
            Ok(None) => continue,
            Err(err) => {
                return Err(Error::new(
                    ErrorKind::InvalidOperation,
                    format!("resolver '{}' failed for '{}'", resolver.name(), name),
                )
                .with_source(err));
            }
        }
    }
    Ok(None)
}

impl TemplateEngine for MiniJinjaEngine {
    fn add_resolver(&mut self, resolver: Arc<dyn TemplateResolver>) {
        tracing::debug!(resolver = %resolver.name(), "registering template resolver");
        self.resolvers.write().push(resolver);
        // Templates cached before this point were resolved without the new resolver.
        self.env.clear_templates();
    }

    fn resolver_names(&self) -> Vec<String> {
        self.resolvers.read().iter().map(|r| r.name()).collect()
    }

    fn process(
        &self,
        path: &str,
        context: &EngineContext,
        out: &mut dyn Write,
    ) -> Result<(), RenderError> {
        let template = self.env.get_template(path)?;
        template.render_to_write(context, out)?;
        Ok(())
    }
}

impl std::fmt::Debug for MiniJinjaEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiniJinjaEngine")
            .field("resolvers", &self.resolver_names())
            .finish()
    }
}
