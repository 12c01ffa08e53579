//! Named component lookup and environment-bound resources.
//!
//! Some engine configuration depends on objects that only exist once the
//! hosting environment has started, such as the per-application resource
//! context of a web container. Those objects are reached through a
//! [`ComponentRegistry`]: the host registers its front controller under a name
//! during startup, and a deferred builder looks it up when the engine is first
//! needed.
//!
//! The registry is injected, never global. [`InMemoryRegistry`] is a simple
//! implementation suitable for hosts that populate it themselves.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

/// Environment-bound context of the serving application.
///
/// Gives access to resources packaged with the web application and to its
/// application-wide attributes.
pub trait ResourceContext: Send + Sync {
    /// Reads the resource at `path` (relative to the application root).
    ///
    /// Returns `Ok(None)` if there is no such resource.
    fn read(&self, path: &str) -> io::Result<Option<String>>;

    /// Application-wide attributes exposed to templates.
    fn attributes(&self) -> BTreeMap<String, serde_json::Value> {
        BTreeMap::new()
    }

    /// A short label used in logs and resolver names.
    fn label(&self) -> String {
        "resource-context".to_string()
    }
}

/// A component that can hand out its environment-bound resource context.
///
/// Front controllers implement this once the container has initialized them.
pub trait ResourceHost: Send + Sync {
    /// The resource context this component was started with.
    fn resource_context(&self) -> Arc<dyn ResourceContext>;
}

/// Name-keyed component lookup.
///
/// `lookup` must return `None` for absent names rather than failing.
pub trait ComponentRegistry: Send + Sync {
    /// Looks up a component by name.
    fn lookup(&self, name: &str) -> Option<Arc<dyn ResourceHost>>;
}

/// A registry backed by a map, populated at host startup.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use standout_web::{ComponentRegistry, DirResourceContext, InMemoryRegistry, StaticHost};
///
/// let registry = InMemoryRegistry::new();
/// assert!(registry.lookup("webFrontController").is_none());
///
/// let context = Arc::new(DirResourceContext::new("./webapp"));
/// registry.register("webFrontController", Arc::new(StaticHost::new(context)));
/// assert!(registry.lookup("webFrontController").is_some());
/// ```
#[derive(Default)]
pub struct InMemoryRegistry {
    components: RwLock<HashMap<String, Arc<dyn ResourceHost>>>,
}

impl InMemoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a component under `name`.
    pub fn register(&self, name: impl Into<String>, component: Arc<dyn ResourceHost>) {
        self.components.write().insert(name.into(), component);
    }

    /// Removes the component registered under `name`, returning it.
    pub fn remove(&self, name: &str) -> Option<Arc<dyn ResourceHost>> {
        self.components.write().remove(name)
    }

    /// Removes every component.
    pub fn clear(&self) {
        self.components.write().clear();
    }

    /// Returns the number of registered components.
    pub fn len(&self) -> usize {
        self.components.read().len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.components.read().is_empty()
    }
}

impl ComponentRegistry for InMemoryRegistry {
    fn lookup(&self, name: &str) -> Option<Arc<dyn ResourceHost>> {
        self.components.read().get(name).cloned()
    }
}

impl fmt::Debug for InMemoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let components = self.components.read();
        let mut names: Vec<_> = components.keys().collect();
        names.sort();
        f.debug_struct("InMemoryRegistry")
            .field("components", &names)
            .finish()
    }
}

/// A host that always returns the resource context it was created with.
#[derive(Clone)]
pub struct StaticHost {
    context: Arc<dyn ResourceContext>,
}

impl StaticHost {
    /// Wraps `context` as a registrable component.
    pub fn new(context: Arc<dyn ResourceContext>) -> Self {
        Self { context }
    }
}

impl ResourceHost for StaticHost {
    fn resource_context(&self) -> Arc<dyn ResourceContext> {
        Arc::clone(&self.context)
    }
}

/// A resource context serving files from a web application root directory.
///
/// Paths are resolved relative to the root; a leading `/` is ignored. Paths
/// that would leave the root (`..`) are treated as absent.
#[derive(Debug, Clone)]
pub struct DirResourceContext {
    root: PathBuf,
    attributes: BTreeMap<String, serde_json::Value>,
}

impl DirResourceContext {
    /// Creates a context rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Adds an application attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// The application root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(resolved)
    }
}

impl ResourceContext for DirResourceContext {
    fn read(&self, path: &str) -> io::Result<Option<String>> {
        let Some(file) = self.locate(path) else {
            return Ok(None);
        };
        if !file.is_file() {
            return Ok(None);
        }
        std::fs::read_to_string(&file).map(Some)
    }

    fn attributes(&self) -> BTreeMap<String, serde_json::Value> {
        self.attributes.clone()
    }

    fn label(&self) -> String {
        self.root.display().to_string()
    }
}
