//! Configuration types for metamodel exports and object graphs.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from
//! external sources, and every field falls back to its default when absent.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining export and graph settings.
//! - [`ExportConfig`] - Inclusion policy and annotation switches for the exporter.
//! - [`GraphConfig`] - Selection of the types fed to the object graph factory.
//!
//! # Example
//!
//! ```
//! # use metascope::config::ExportConfig;
//! let config = ExportConfig::default()
//!     .with_namespace_prefixes(["sales"])
//!     .with_ignore_mixins(true);
//! assert!(config.matches_namespace("sales.orders"));
//! assert!(!config.matches_namespace("billing"));
//! ```

use serde::Deserialize;

/// Namespace prefix that matches every namespace.
pub const ANY_NAMESPACE: &str = "*";

/// Top-level configuration combining export and graph settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Export configuration section.
    #[serde(default)]
    export: ExportConfig,

    /// Graph configuration section.
    #[serde(default)]
    graph: GraphConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(export: ExportConfig, graph: GraphConfig) -> Self {
        Self { export, graph }
    }

    /// Returns the export configuration.
    pub fn export(&self) -> &ExportConfig {
        &self.export
    }

    /// Returns the graph configuration.
    pub fn graph(&self) -> &GraphConfig {
        &self.graph
    }
}

fn default_namespace_prefixes() -> Vec<String> {
    vec![ANY_NAMESPACE.to_string()]
}

/// Inclusion policy and annotation switches for the metamodel exporter.
///
/// `namespace_prefixes` defaults to [`ANY_NAMESPACE`]. An explicitly empty
/// list matches no namespace at all and yields an empty export.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    #[serde(default = "default_namespace_prefixes")]
    namespace_prefixes: Vec<String>,
    ignore_mixins: bool,
    ignore_interfaces: bool,
    ignore_abstract_classes: bool,
    ignore_builtin_value_types: bool,
    ignore_fallback_facets: bool,
    include_title_annotations: bool,
    include_shadowed_facets: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            namespace_prefixes: default_namespace_prefixes(),
            ignore_mixins: false,
            ignore_interfaces: false,
            ignore_abstract_classes: false,
            ignore_builtin_value_types: false,
            ignore_fallback_facets: false,
            include_title_annotations: false,
            include_shadowed_facets: false,
        }
    }
}

impl ExportConfig {
    /// Replace the namespace prefixes. Duplicates are dropped, order is kept.
    pub fn with_namespace_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespace_prefixes.clear();
        for prefix in prefixes {
            let prefix = prefix.into();
            if !self.namespace_prefixes.contains(&prefix) {
                self.namespace_prefixes.push(prefix);
            }
        }
        self
    }

    pub fn with_ignore_mixins(mut self, ignore: bool) -> Self {
        self.ignore_mixins = ignore;
        self
    }

    pub fn with_ignore_interfaces(mut self, ignore: bool) -> Self {
        self.ignore_interfaces = ignore;
        self
    }

    pub fn with_ignore_abstract_classes(mut self, ignore: bool) -> Self {
        self.ignore_abstract_classes = ignore;
        self
    }

    pub fn with_ignore_builtin_value_types(mut self, ignore: bool) -> Self {
        self.ignore_builtin_value_types = ignore;
        self
    }

    pub fn with_ignore_fallback_facets(mut self, ignore: bool) -> Self {
        self.ignore_fallback_facets = ignore;
        self
    }

    pub fn with_title_annotations(mut self, include: bool) -> Self {
        self.include_title_annotations = include;
        self
    }

    pub fn with_shadowed_facets(mut self, include: bool) -> Self {
        self.include_shadowed_facets = include;
        self
    }

    /// Configured prefixes in configuration order.
    pub fn namespace_prefixes(&self) -> &[String] {
        &self.namespace_prefixes
    }

    pub fn is_any_namespace(&self) -> bool {
        self.namespace_prefixes
            .iter()
            .any(|prefix| prefix == ANY_NAMESPACE)
    }

    /// Whether `namespace` starts with any configured prefix.
    pub fn matches_namespace(&self, namespace: &str) -> bool {
        self.is_any_namespace()
            || self
                .namespace_prefixes
                .iter()
                .any(|prefix| namespace.starts_with(prefix.as_str()))
    }

    pub fn ignore_mixins(&self) -> bool {
        self.ignore_mixins
    }

    pub fn ignore_interfaces(&self) -> bool {
        self.ignore_interfaces
    }

    pub fn ignore_abstract_classes(&self) -> bool {
        self.ignore_abstract_classes
    }

    pub fn ignore_builtin_value_types(&self) -> bool {
        self.ignore_builtin_value_types
    }

    pub fn ignore_fallback_facets(&self) -> bool {
        self.ignore_fallback_facets
    }

    pub fn include_title_annotations(&self) -> bool {
        self.include_title_annotations
    }

    pub fn include_shadowed_facets(&self) -> bool {
        self.include_shadowed_facets
    }
}

/// Selection of the types fed to the object graph factory.
///
/// Entities are always selected; namespaces are filtered with the export
/// section's prefixes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Also select abstract types that are not entities.
    include_abstract: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            include_abstract: true,
        }
    }
}

impl GraphConfig {
    pub fn new(include_abstract: bool) -> Self {
        Self { include_abstract }
    }

    pub fn include_abstract(&self) -> bool {
        self.include_abstract
    }
}
