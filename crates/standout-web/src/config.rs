//! Writer settings.
//!
//! Hosts that configure writers from files describe them with a
//! [`WriterConfig`], usually as YAML:
//!
//! ```yaml
//! path_pattern: '/template/.*\.html'
//! component_name: webFrontController
//! resolver_prefix: /WEB-INF/templates/
//! resolver_suffix: .html
//! ```
//!
//! Every key is optional. Unknown keys are rejected so typos surface at
//! startup.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::WriterError;
use crate::matcher::DEFAULT_PATH_PATTERN;
use crate::registry::ComponentRegistry;
use crate::template::{
    DeferredResourceBuilder, PathAffixes, ResourceResolverStep, TemplateMethodBuilder,
    DEFAULT_COMPONENT_NAME,
};
use crate::writer::{ResponseWriter, ResponseWriterBuilder};

/// Settings for a template-backed response writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WriterConfig {
    /// Content path pattern, full-match.
    pub path_pattern: String,
    /// Registry name of the component providing the resource context.
    pub component_name: String,
    /// Prefix applied to content paths by the resource context resolver.
    pub resolver_prefix: String,
    /// Suffix applied to content paths by the resource context resolver.
    pub resolver_suffix: String,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            path_pattern: DEFAULT_PATH_PATTERN.to_string(),
            component_name: DEFAULT_COMPONENT_NAME.to_string(),
            resolver_prefix: String::new(),
            resolver_suffix: String::new(),
        }
    }
}

impl WriterConfig {
    /// Parses settings from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, WriterError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads settings from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, WriterError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| WriterError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    /// A deferred builder adding a resource context resolver as configured.
    pub fn deferred_builder(&self, registry: Arc<dyn ComponentRegistry>) -> DeferredResourceBuilder {
        let step = ResourceResolverStep::new(registry)
            .with_component_name(&self.component_name)
            .with_affixes(PathAffixes::new(&self.resolver_prefix, &self.resolver_suffix));
        TemplateMethodBuilder::new(step)
    }

    /// A writer builder with this pattern and a deferred builder over `registry`.
    pub fn writer_builder(&self, registry: Arc<dyn ComponentRegistry>) -> ResponseWriterBuilder {
        ResponseWriter::builder()
            .path_pattern(&self.path_pattern)
            .engine_builder(self.deferred_builder(registry))
    }
}

impl ResponseWriter {
    /// Creates a writer whose engine is assembled from `registry` on first
    /// render, as described by `config`.
    pub fn from_config(
        config: &WriterConfig,
        registry: Arc<dyn ComponentRegistry>,
    ) -> Result<Self, WriterError> {
        config.writer_builder(registry).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InMemoryRegistry;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = WriterConfig::from_yaml("{}").unwrap();
        assert_eq!(config, WriterConfig::default());
        assert_eq!(config.path_pattern, r".*\.html");
        assert_eq!(config.component_name, "webFrontController");
    }

    #[test]
    fn parses_all_keys() {
        let config = WriterConfig::from_yaml(
            r#"
path_pattern: '/template/.*\.html'
component_name: frontController
resolver_prefix: /WEB-INF/templates/
resolver_suffix: .html
"#,
        )
        .unwrap();
        assert_eq!(config.path_pattern, r"/template/.*\.html");
        assert_eq!(config.component_name, "frontController");
        assert_eq!(config.resolver_prefix, "/WEB-INF/templates/");
        assert_eq!(config.resolver_suffix, ".html");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = WriterConfig::from_yaml("path_patern: x").unwrap_err();
        assert!(matches!(err, WriterError::Config(_)));
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "component_name: fc").unwrap();
        let config = WriterConfig::from_file(file.path()).unwrap();
        assert_eq!(config.component_name, "fc");
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("writer.yaml");
        match WriterConfig::from_file(&missing) {
            Err(WriterError::ConfigRead { path, source }) => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected ConfigRead, got {:?}", other),
        }
    }

    #[test]
    fn writer_from_config_uses_pattern_and_defers_build() {
        let config = WriterConfig {
            path_pattern: r"/views/.*".to_string(),
            ..WriterConfig::default()
        };
        let writer =
            ResponseWriter::from_config(&config, Arc::new(InMemoryRegistry::new())).unwrap();
        assert!(writer.is_responsible_to("/views/a.txt"));
        assert!(!writer.is_responsible_to("/a.html"));
        assert!(!writer.is_resolved());
        assert!(matches!(writer.engine(), Err(WriterError::Lookup { .. })));
    }
}
