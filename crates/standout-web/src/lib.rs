//! # Standout Web - Template-Backed Response Writers
//!
//! `standout-web` lets a web request pipeline hand response rendering to a
//! template engine without depending on a particular engine. It covers three
//! concerns:
//!
//! - Responsibility: deciding whether a writer should render a response, by
//!   full-matching the content path against a pattern ([`PathMatcher`]).
//! - Sharing: resolving one engine lazily and safely for all concurrent
//!   requests ([`ResponseWriter`]).
//! - Deferred assembly: building an engine that needs objects which only
//!   exist after the host has started ([`DeferredResourceBuilder`]).
//!
//! ## Core Concepts
//!
//! - [`ResponseWriter`]: matches content paths and renders through an engine
//! - [`EngineSource`]: a ready engine, or a builder run on first render
//! - [`TemplateEngine`]: the engine contract; [`MiniJinjaEngine`] implements it
//! - [`TemplateResolver`]: maps content paths to template source
//! - [`EngineBuilder`] / [`TemplateMethodBuilder`]: engine assembly
//! - [`ComponentRegistry`]: named lookup of host components
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use standout_web::{
//!     BufferedResponse, InlineResolver, MiniJinjaEngine, RenderContext, ResponseWriter,
//!     SimpleRequest, TemplateEngine,
//! };
//!
//! let mut engine = MiniJinjaEngine::new();
//! engine.add_resolver(Arc::new(InlineResolver::new().with_template(
//!     "/greet.html",
//!     "<p>{{ param.msg }}</p><p>{{ sayHelloTo }}</p>",
//! )));
//!
//! let writer = ResponseWriter::builder().engine(engine).build().unwrap();
//!
//! let request = SimpleRequest::new("GET", "/").with_param("msg", "I am parameter.");
//! let mut response = BufferedResponse::new();
//! let ctx = RenderContext::new(&request, &mut response).with_var("sayHelloTo", "Nabchan");
//!
//! if writer.is_responsible_to("/greet.html") {
//!     writer.render("/greet.html", ctx).unwrap();
//! }
//! assert_eq!(response.body_string(), "<p>I am parameter.</p><p>Nabchan</p>");
//! ```
//!
//! ## Deferred Engine Assembly
//!
//! When templates live inside the deployed web application, the resolver
//! needs the application's resource context, which the container only creates
//! at startup. Configure the writer with a [`DeferredResourceBuilder`]; it
//! looks up the front controller in the [`ComponentRegistry`] on first render:
//!
//! ```rust
//! use std::sync::Arc;
//! use standout_web::{
//!     DeferredResourceBuilder, DirResourceContext, InMemoryRegistry, ResponseWriter,
//!     StaticHost, WriterError,
//! };
//!
//! let registry = Arc::new(InMemoryRegistry::new());
//! let writer = ResponseWriter::builder()
//!     .engine_builder(DeferredResourceBuilder::from_registry(registry.clone()))
//!     .build()
//!     .unwrap();
//!
//! // Before startup completes the lookup fails, and nothing is cached.
//! assert!(matches!(writer.engine(), Err(WriterError::Lookup { .. })));
//!
//! // The host registers its front controller during startup.
//! let context = Arc::new(DirResourceContext::new("./webapp"));
//! registry.register("webFrontController", Arc::new(StaticHost::new(context)));
//! assert!(writer.engine().is_ok());
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (engine building, resolver registration,
//! failed lookups). It installs no subscriber.

pub mod config;
pub mod context;
mod error;
pub mod locale;
mod matcher;
pub mod registry;
pub mod template;
pub mod writer;

pub use config::WriterConfig;
pub use context::{
    BufferedResponse, EngineContext, RenderContext, SimpleRequest, WebRequest, WebResponse,
};
pub use error::{RenderError, WriterError};
pub use locale::{FixedLocale, Locale, LocaleSource, ThreadLocale};
pub use matcher::{PathMatcher, DEFAULT_PATH_PATTERN};
pub use registry::{
    ComponentRegistry, DirResourceContext, InMemoryRegistry, ResourceContext, ResourceHost,
    StaticHost,
};
pub use template::{
    Customize, DeferredResourceBuilder, EngineBuilder, EngineFactory, FileResolver,
    InlineResolver, MiniJinjaEngine, PathAffixes, ResourceContextResolver, ResourceResolverStep,
    TemplateEngine, TemplateMethodBuilder, TemplateResolver, DEFAULT_COMPONENT_NAME,
};
pub use writer::{CustomResponseWriter, EngineSource, ResponseWriter, ResponseWriterBuilder};
