//! Render-time context.
//!
//! Two context types are involved in writing a response:
//!
//! 1. [`RenderContext`]: what the hosting pipeline hands to a writer. It borrows
//!    the request and response and carries the request-scoped variables and the
//!    environment's [`ResourceContext`]. It is built fresh for every call and
//!    never retained.
//! 2. [`EngineContext`]: what the writer hands to the engine. It is an owned,
//!    serializable snapshot of the data templates may read.
//!
//! # Template Variables
//!
//! An [`EngineContext`] serializes to a map with these entries:
//!
//! | Name | Content |
//! |------|---------|
//! | `param` | First value of each request parameter |
//! | `params` | All values of each request parameter |
//! | `request` | `method` and `path` of the request |
//! | `application` | Attributes of the environment's resource context |
//! | `locale` | The locale tag for this render |
//! | *other names* | Request-scoped variables |
//!
//! Request-scoped variables cannot shadow the reserved names above.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::locale::Locale;
use crate::registry::ResourceContext;

/// Names that request-scoped variables cannot override.
pub const RESERVED_NAMES: &[&str] = &["param", "params", "request", "application", "locale"];

/// The incoming request, as seen by a writer.
pub trait WebRequest: Send + Sync {
    /// HTTP method, e.g. `GET`.
    fn method(&self) -> &str;

    /// Request path, e.g. `/orders/42`.
    fn path(&self) -> &str;

    /// Request parameters with all of their values.
    fn parameters(&self) -> BTreeMap<String, Vec<String>>;
}

/// The outgoing response, as seen by a writer.
pub trait WebResponse {
    /// The sink the response body is written to.
    fn writer(&mut self) -> &mut dyn Write;
}

/// A plain request value.
#[derive(Debug, Clone, Default)]
pub struct SimpleRequest {
    method: String,
    path: String,
    parameters: BTreeMap<String, Vec<String>>,
}

impl SimpleRequest {
    /// Creates a request with no parameters.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Appends a value for parameter `name`.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }
}

impl WebRequest for SimpleRequest {
    fn method(&self) -> &str {
        &self.method
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn parameters(&self) -> BTreeMap<String, Vec<String>> {
        self.parameters.clone()
    }
}

/// A response that collects its body in memory.
#[derive(Debug, Clone, Default)]
pub struct BufferedResponse {
    body: Vec<u8>,
}

impl BufferedResponse {
    /// Creates an empty response.
    pub fn new() -> Self {
        Self::default()
    }

    /// The bytes written so far.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body decoded as UTF-8, lossily.
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl WebResponse for BufferedResponse {
    fn writer(&mut self) -> &mut dyn Write {
        &mut self.body
    }
}

/// Everything a writer receives for one render call.
pub struct RenderContext<'a> {
    /// The request being served.
    pub request: &'a dyn WebRequest,

    /// The response to write to.
    pub response: &'a mut dyn WebResponse,

    /// The serving application's resource context, if the host provides one.
    pub environment: Option<Arc<dyn ResourceContext>>,

    /// Variables set by handlers earlier in the pipeline.
    pub scoped_vars: BTreeMap<String, Value>,
}

impl<'a> RenderContext<'a> {
    /// Creates a context with no environment and no scoped variables.
    pub fn new(request: &'a dyn WebRequest, response: &'a mut dyn WebResponse) -> Self {
        Self {
            request,
            response,
            environment: None,
            scoped_vars: BTreeMap::new(),
        }
    }

    /// Attaches the environment's resource context.
    pub fn with_environment(mut self, environment: Arc<dyn ResourceContext>) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Sets a request-scoped variable.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.scoped_vars.insert(name.into(), value.into());
        self
    }

    /// Builds the engine-facing snapshot of this context for `locale`.
    pub fn engine_context(&self, locale: Locale) -> EngineContext {
        EngineContext {
            method: self.request.method().to_string(),
            path: self.request.path().to_string(),
            params: self.request.parameters(),
            application: self
                .environment
                .as_ref()
                .map(|env| env.attributes())
                .unwrap_or_default(),
            locale,
            vars: self.scoped_vars.clone(),
        }
    }
}

/// The data an engine renders with.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineContext {
    method: String,
    path: String,
    params: BTreeMap<String, Vec<String>>,
    application: BTreeMap<String, Value>,
    locale: Locale,
    vars: BTreeMap<String, Value>,
}

impl EngineContext {
    /// Creates an empty context for a `GET /` request.
    pub fn new(locale: Locale) -> Self {
        Self {
            method: "GET".to_string(),
            path: "/".to_string(),
            params: BTreeMap::new(),
            application: BTreeMap::new(),
            locale,
            vars: BTreeMap::new(),
        }
    }

    /// Sets a variable.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Appends a request parameter value.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.entry(name.into()).or_default().push(value.into());
        self
    }

    /// The locale for this render.
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Looks up a request-scoped variable.
    pub fn var(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// The first value of request parameter `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

impl Serialize for EngineContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let first_values: BTreeMap<&str, &str> = self
            .params
            .iter()
            .filter_map(|(name, values)| Some((name.as_str(), values.first()?.as_str())))
            .collect();
        let request: BTreeMap<&str, &str> =
            [("method", self.method.as_str()), ("path", self.path.as_str())]
                .into_iter()
                .collect();

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("param", &first_values)?;
        map.serialize_entry("params", &self.params)?;
        map.serialize_entry("request", &request)?;
        map.serialize_entry("application", &self.application)?;
        map.serialize_entry("locale", &self.locale)?;
        for (name, value) in &self.vars {
            if RESERVED_NAMES.contains(&name.as_str()) {
                continue;
            }
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
