//! Template engines, resolvers and engine assembly.
//!
//! ## Engines
//!
//! [`TemplateEngine`] is the contract writers render through. It knows how to
//! register a [`TemplateResolver`] and how to process a content path into a
//! sink. [`MiniJinjaEngine`] is the bundled implementation.
//!
//! ## Assembly
//!
//! An engine is either supplied ready-made or produced by an [`EngineBuilder`].
//! [`TemplateMethodBuilder`] reuses a base engine (or creates one) and runs a
//! [`Customize`] step; [`DeferredResourceBuilder`] is the builder whose step
//! needs the started host.
//!
//! ## See Also
//!
//! - [`crate::writer`]: how writers resolve and share engines
//! - [`crate::registry`]: the component lookup deferred builders rely on

mod builder;
mod deferred;
mod engine;
mod resolver;

pub use builder::{Customize, EngineBuilder, EngineFactory, TemplateMethodBuilder};
pub use deferred::{DeferredResourceBuilder, ResourceResolverStep, DEFAULT_COMPONENT_NAME};
pub use engine::{MiniJinjaEngine, TemplateEngine};
pub use resolver::{
    FileResolver, InlineResolver, PathAffixes, ResourceContextResolver, TemplateResolver,
};
