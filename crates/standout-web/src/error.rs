//! Error types for response writing.
//!
//! [`RenderError`] covers failures inside a template engine or its output sink.
//! [`WriterError`] is what the public writer and builder APIs return; it wraps
//! `RenderError` and adds the setup and lookup failures that happen before any
//! template is touched.

use std::io;
use std::path::PathBuf;

/// Errors raised by a template engine while resolving or rendering a template.
///
/// This type keeps the underlying engine's error types out of the public API.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No registered resolver produced a template for the path.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// Template syntax error or evaluation failure.
    #[error("template error: {0}")]
    TemplateError(String),

    /// Writing to the output sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Context data could not be serialized for the engine.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Other engine failure.
    #[error("{0}")]
    Operation(String),
}

impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        match err.kind() {
            ErrorKind::TemplateNotFound => RenderError::TemplateNotFound(err.to_string()),
            ErrorKind::SyntaxError
            | ErrorKind::BadEscape
            | ErrorKind::UndefinedError
            | ErrorKind::UnknownTest
            | ErrorKind::UnknownFunction
            | ErrorKind::UnknownFilter
            | ErrorKind::UnknownMethod => RenderError::TemplateError(err.to_string()),
            ErrorKind::BadSerialization => RenderError::Serialization(err.to_string()),
            ErrorKind::WriteFailure => {
                RenderError::Io(io::Error::other(err.to_string()))
            }
            _ => RenderError::Operation(err.to_string()),
        }
    }
}

/// Errors returned by response writers and engine builders.
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// Neither an engine nor an engine builder was configured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A component required for deferred engine assembly is not registered.
    #[error("could not find component '{name}'.")]
    Lookup { name: String },

    /// The path pattern is not a valid regular expression.
    #[error("invalid path pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A writer settings file could not be read.
    #[error("could not read writer config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writer settings could not be parsed.
    #[error("invalid writer config: {0}")]
    Config(#[from] serde_yaml::Error),

    /// The engine or the output sink failed during rendering.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl WriterError {
    /// Creates a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a lookup error for the named component.
    pub fn lookup(name: impl Into<String>) -> Self {
        Self::Lookup { name: name.into() }
    }
}
