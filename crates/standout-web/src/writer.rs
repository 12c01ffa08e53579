//! Template-backed response writers.
//!
//! A hosting pipeline keeps a list of [`CustomResponseWriter`]s. For each
//! response it asks them in turn whether they are responsible for the
//! response's content path, and hands the response to the first one that is.
//!
//! [`ResponseWriter`] is the template-backed implementation. It matches
//! content paths against a [`PathMatcher`] and renders through a
//! [`TemplateEngine`] obtained from its [`EngineSource`].
//!
//! # Engine Resolution
//!
//! The engine is resolved on the first render and shared by every render
//! after that:
//!
//! ```text
//! Unresolved ──first successful render──▶ Resolved(engine)
//!     │
//!     └── build fails / nothing configured: stays Unresolved, error returned
//! ```
//!
//! Resolution runs under a critical section. However many threads render
//! concurrently, a builder produces at most one engine and every thread sees
//! the same one. Once resolved, renders read the engine without locking.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::context::RenderContext;
use crate::error::WriterError;
use crate::locale::{LocaleSource, ThreadLocale};
use crate::matcher::PathMatcher;
use crate::template::{EngineBuilder, TemplateEngine};

/// A writer a hosting pipeline can delegate response output to.
pub trait CustomResponseWriter: Send + Sync {
    /// Returns true if this writer should write the response for `path`.
    fn is_responsible_to(&self, path: &str) -> bool;

    /// Writes the response for `path`.
    fn write_response(&self, path: &str, ctx: RenderContext<'_>) -> Result<(), WriterError>;
}

/// Where a writer's engine comes from.
///
/// Chosen once when the writer is set up. If both an engine and a builder are
/// configured, the engine wins and the builder is never used.
pub enum EngineSource {
    /// A ready engine.
    Explicit(Arc<dyn TemplateEngine>),
    /// A builder run on first use.
    Deferred(Mutex<Box<dyn EngineBuilder>>),
    /// Nothing configured; every render fails.
    Unconfigured,
}

impl EngineSource {
    /// Chooses the source from optional settings.
    pub fn from_parts(
        engine: Option<Arc<dyn TemplateEngine>>,
        builder: Option<Box<dyn EngineBuilder>>,
    ) -> Self {
        match (engine, builder) {
            (Some(engine), Some(_)) => {
                tracing::warn!("both an engine and an engine builder are configured; the builder is ignored");
                EngineSource::Explicit(engine)
            }
            (Some(engine), None) => EngineSource::Explicit(engine),
            (None, Some(builder)) => EngineSource::Deferred(Mutex::new(builder)),
            (None, None) => EngineSource::Unconfigured,
        }
    }

    /// Returns true unless the source is [`EngineSource::Unconfigured`].
    pub fn is_configured(&self) -> bool {
        !matches!(self, EngineSource::Unconfigured)
    }

    fn resolve(&self) -> Result<Arc<dyn TemplateEngine>, WriterError> {
        match self {
            EngineSource::Explicit(engine) => Ok(Arc::clone(engine)),
            EngineSource::Deferred(builder) => {
                tracing::debug!("building template engine");
                let engine = builder.lock().build()?;
                Ok(Arc::from(engine))
            }
            EngineSource::Unconfigured => Err(WriterError::configuration(
                "neither a template engine nor an engine builder is configured",
            )),
        }
    }
}

impl fmt::Debug for EngineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineSource::Explicit(_) => f.write_str("Explicit"),
            EngineSource::Deferred(_) => f.write_str("Deferred"),
            EngineSource::Unconfigured => f.write_str("Unconfigured"),
        }
    }
}

/// Renders responses whose content path matches a pattern through a template
/// engine.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use standout_web::{
///     BufferedResponse, InlineResolver, MiniJinjaEngine, RenderContext, ResponseWriter,
///     SimpleRequest, TemplateEngine,
/// };
///
/// let mut engine = MiniJinjaEngine::new();
/// engine.add_resolver(Arc::new(
///     InlineResolver::new().with_template("/hello.html", "<p>Hello, {{ name }}</p>"),
/// ));
///
/// let writer = ResponseWriter::builder().engine(engine).build().unwrap();
/// assert!(writer.is_responsible_to("/hello.html"));
/// assert!(!writer.is_responsible_to("/hello.json"));
///
/// let request = SimpleRequest::new("GET", "/");
/// let mut response = BufferedResponse::new();
/// let ctx = RenderContext::new(&request, &mut response).with_var("name", "Nabchan");
/// writer.render("/hello.html", ctx).unwrap();
/// assert_eq!(response.body_string(), "<p>Hello, Nabchan</p>");
/// ```
pub struct ResponseWriter {
    matcher: PathMatcher,
    source: EngineSource,
    resolved: OnceCell<Arc<dyn TemplateEngine>>,
    locale: Arc<dyn LocaleSource>,
}

impl ResponseWriter {
    /// Starts configuring a writer.
    pub fn builder() -> ResponseWriterBuilder {
        ResponseWriterBuilder::default()
    }

    /// Returns true if `path` fully matches this writer's pattern.
    pub fn is_responsible_to(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }

    /// Renders the template at `path` into the response of `ctx`.
    ///
    /// # Errors
    ///
    /// - [`WriterError::Configuration`] if no engine can be resolved; nothing
    ///   is written in that case.
    /// - Any error of the engine builder, such as [`WriterError::Lookup`].
    /// - [`WriterError::Render`] if the engine or the output sink fails.
    pub fn render(&self, path: &str, mut ctx: RenderContext<'_>) -> Result<(), WriterError> {
        let engine = self.engine()?;
        let engine_ctx = ctx.engine_context(self.locale.current());
        tracing::debug!(path, locale = %engine_ctx.locale(), "rendering template");
        engine.process(path, &engine_ctx, ctx.response.writer())?;
        Ok(())
    }

    /// Resolves the engine, building it on first use.
    pub fn engine(&self) -> Result<Arc<dyn TemplateEngine>, WriterError> {
        self.resolved
            .get_or_try_init(|| self.source.resolve())
            .map(Arc::clone)
    }

    /// Returns true once an engine has been resolved.
    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// The configured path matcher.
    pub fn matcher(&self) -> &PathMatcher {
        &self.matcher
    }

    /// The configured engine source.
    pub fn source(&self) -> &EngineSource {
        &self.source
    }
}

impl CustomResponseWriter for ResponseWriter {
    fn is_responsible_to(&self, path: &str) -> bool {
        ResponseWriter::is_responsible_to(self, path)
    }

    fn write_response(&self, path: &str, ctx: RenderContext<'_>) -> Result<(), WriterError> {
        self.render(path, ctx)
    }
}

impl fmt::Debug for ResponseWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseWriter")
            .field("matcher", &self.matcher)
            .field("source", &self.source)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// Configures a [`ResponseWriter`].
///
/// All settings are fixed once [`build`](Self::build) returns.
#[derive(Default)]
pub struct ResponseWriterBuilder {
    pattern: Option<String>,
    engine: Option<Arc<dyn TemplateEngine>>,
    builder: Option<Box<dyn EngineBuilder>>,
    locale: Option<Arc<dyn LocaleSource>>,
}

impl ResponseWriterBuilder {
    /// Sets the content path pattern (default `.*\.html`).
    pub fn path_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Uses a ready engine.
    pub fn engine<E: TemplateEngine + 'static>(self, engine: E) -> Self {
        self.shared_engine(Arc::new(engine))
    }

    /// Uses a ready engine that is also shared elsewhere.
    pub fn shared_engine(mut self, engine: Arc<dyn TemplateEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Builds the engine on first render with `builder`.
    ///
    /// Ignored if an engine is also configured.
    pub fn engine_builder<B: EngineBuilder + 'static>(mut self, builder: B) -> Self {
        self.builder = Some(Box::new(builder));
        self
    }

    /// Replaces where the render locale comes from (default: [`ThreadLocale`]).
    pub fn locale_source<L: LocaleSource + 'static>(mut self, source: L) -> Self {
        self.locale = Some(Arc::new(source));
        self
    }

    /// Builds the writer.
    ///
    /// # Errors
    ///
    /// Returns [`WriterError::InvalidPattern`] if the path pattern does not
    /// compile. A writer without engine or builder is still built; it fails on
    /// render.
    pub fn build(self) -> Result<ResponseWriter, WriterError> {
        let matcher = match &self.pattern {
            Some(pattern) => PathMatcher::new(pattern)?,
            None => PathMatcher::default(),
        };
        let source = EngineSource::from_parts(self.engine, self.builder);
        if !source.is_configured() {
            tracing::warn!(pattern = matcher.as_str(), "response writer has no template engine");
        }
        Ok(ResponseWriter {
            matcher,
            source,
            resolved: OnceCell::new(),
            locale: self.locale.unwrap_or_else(|| Arc::new(ThreadLocale)),
        })
    }
}

impl fmt::Debug for ResponseWriterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseWriterBuilder")
            .field("pattern", &self.pattern)
            .field("engine", &self.engine.is_some())
            .field("builder", &self.builder.is_some())
            .finish()
    }
}
