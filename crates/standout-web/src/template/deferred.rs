//! Engine assembly that depends on the started host.
//!
//! A [`ResourceContextResolver`] needs the serving application's resource
//! context, which only exists once the container has started the application.
//! Component wiring happens earlier, so the resolver cannot be created there.
//! Instead the [`DeferredResourceBuilder`] looks up the host's front controller
//! by name when the engine is first built and takes the resource context from
//! it.
//!
//! # Startup Order
//!
//! ```text
//! container starts the application
//!   → components are wired (writer and builder created, nothing built)
//!   → initialization callbacks run
//!   → front controller is registered in the ComponentRegistry
//!   → first render: DeferredResourceBuilder::build looks it up
//! ```
//!
//! `build` must therefore not run before the registry is populated. An early
//! call fails with [`WriterError::Lookup`]; since nothing is cached on failure,
//! a later call after population succeeds.

use std::sync::Arc;

use super::builder::{Customize, TemplateMethodBuilder};
use super::engine::TemplateEngine;
use super::resolver::{PathAffixes, ResourceContextResolver};
use crate::error::WriterError;
use crate::registry::ComponentRegistry;

/// Name under which hosts register their front controller by default.
pub const DEFAULT_COMPONENT_NAME: &str = "webFrontController";

/// Customization step adding a resolver over the host's resource context.
pub struct ResourceResolverStep {
    registry: Arc<dyn ComponentRegistry>,
    component_name: String,
    affixes: PathAffixes,
}

impl ResourceResolverStep {
    /// Creates a step looking up [`DEFAULT_COMPONENT_NAME`] in `registry`.
    pub fn new(registry: Arc<dyn ComponentRegistry>) -> Self {
        Self {
            registry,
            component_name: DEFAULT_COMPONENT_NAME.to_string(),
            affixes: PathAffixes::default(),
        }
    }

    /// Looks up `name` instead of the default component name.
    pub fn with_component_name(mut self, name: impl Into<String>) -> Self {
        self.component_name = name.into();
        self
    }

    /// Sets the prefix and suffix of the created resolver.
    pub fn with_affixes(mut self, affixes: PathAffixes) -> Self {
        self.affixes = affixes;
        self
    }

    /// The component name looked up on build.
    pub fn component_name(&self) -> &str {
        &self.component_name
    }

    fn create_resolver(&self) -> Result<ResourceContextResolver, WriterError> {
        let Some(component) = self.registry.lookup(&self.component_name) else {
            tracing::warn!(
                component = %self.component_name,
                "component not registered; was the engine built before host startup completed?"
            );
            return Err(WriterError::lookup(&self.component_name));
        };
        let context = component.resource_context();
        Ok(ResourceContextResolver::new(context).with_affixes(self.affixes.clone()))
    }
}

impl Customize for ResourceResolverStep {
    fn process(&self, engine: &mut dyn TemplateEngine) -> Result<(), WriterError> {
        let resolver = self.create_resolver()?;
        engine.add_resolver(Arc::new(resolver));
        tracing::info!(component = %self.component_name, "added resource context resolver");
        Ok(())
    }
}

/// Builder adding a [`ResourceContextResolver`] once the host has started.
pub type DeferredResourceBuilder = TemplateMethodBuilder<ResourceResolverStep>;

impl DeferredResourceBuilder {
    /// Creates a builder looking up [`DEFAULT_COMPONENT_NAME`] in `registry`.
    pub fn from_registry(registry: Arc<dyn ComponentRegistry>) -> Self {
        TemplateMethodBuilder::new(ResourceResolverStep::new(registry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EngineContext;
    use crate::locale::Locale;
    use crate::registry::{DirResourceContext, InMemoryRegistry, ResourceContext, StaticHost};
    use crate::template::builder::EngineBuilder;
    use crate::template::engine::MiniJinjaEngine;
    use crate::template::resolver::FileResolver;
    use std::fs;
    use tempfile::TempDir;

    fn registry_with(dir: &TempDir) -> Arc<InMemoryRegistry> {
        let registry = Arc::new(InMemoryRegistry::new());
        let ctx: Arc<dyn ResourceContext> = Arc::new(DirResourceContext::new(dir.path()));
        registry.register(DEFAULT_COMPONENT_NAME, Arc::new(StaticHost::new(ctx)));
        registry
    }

    #[test]
    fn adds_resource_resolver_and_keeps_existing() {
        let webapp = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let registry = registry_with(&webapp);

        let mut base = MiniJinjaEngine::new();
        base.add_resolver(Arc::new(FileResolver::new(other.path())));

        let mut builder =
            DeferredResourceBuilder::from_registry(registry).with_engine(Box::new(base));
        let engine = builder.build().unwrap();

        let names = engine.resolver_names();
        assert_eq!(names.len(), 2);
        assert!(names[0].starts_with("file:"));
        assert!(names[1].starts_with("resource:"));
    }

    #[test]
    fn missing_component_is_lookup_error() {
        let registry = Arc::new(InMemoryRegistry::new());
        let mut builder = DeferredResourceBuilder::from_registry(registry);
        let err = builder.build().unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not find component 'webFrontController'."
        );
    }

    #[test]
    fn custom_component_name_and_affixes() {
        let webapp = TempDir::new().unwrap();
        fs::create_dir_all(webapp.path().join("WEB-INF/views")).unwrap();
        fs::write(webapp.path().join("WEB-INF/views/home.html"), "home {{ locale }}").unwrap();

        let registry = Arc::new(InMemoryRegistry::new());
        let ctx: Arc<dyn ResourceContext> = Arc::new(DirResourceContext::new(webapp.path()));
        registry.register("frontController", Arc::new(StaticHost::new(ctx)));

        let step = ResourceResolverStep::new(registry)
            .with_component_name("frontController")
            .with_affixes(PathAffixes::new("/WEB-INF/views/", ".html"));
        assert_eq!(step.component_name(), "frontController");

        let engine = TemplateMethodBuilder::new(step).build().unwrap();
        let output = engine
            .process_to_string("home", &EngineContext::new(Locale::new("fr")))
            .unwrap();
        assert_eq!(output, "home fr");
    }
}
