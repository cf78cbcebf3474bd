//! Metascope - metamodel export and object-relationship graphs.
//!
//! Given a [`TypeProvider`](metascope_core::provider::TypeProvider) describing
//! the types of a domain, metascope produces two artifacts:
//!
//! - an [`ExportDocument`](export::ExportDocument): one record per type with its
//!   facets, properties, collections and actions, fully sorted so identical
//!   inputs give identical output;
//! - an [`ObjectGraph`](graph::ObjectGraph): one node per logical type with
//!   association and inheritance relations, suitable for UML-style rendering.

pub mod config;
pub mod export;
pub mod graph;

mod error;

pub use metascope_core::{descriptor, facet, identifier, provider};

pub use error::{DuplicateLogicalTypes, DuplicateMapping, MetascopeError};

use log::{debug, info};

use metascope_core::{
    descriptor::TypeDescriptor,
    provider::{TypeProvider, TypeUniverse},
};

use config::AppConfig;
use export::{ExportDocument, MetamodelExporter};
use graph::{ObjectGraph, ObjectGraphFactory};

/// Entry point bundling an [`AppConfig`] with the export and graph pipelines.
///
/// # Examples
///
/// ```
/// use metascope::{MetamodelBuilder, config::AppConfig};
///
/// let source = r#"
/// [[types]]
/// class = "com.acme.Customer"
/// logical_type = "sales.Customer"
/// sort = "entity"
/// "#;
///
/// let builder = MetamodelBuilder::new(AppConfig::default());
/// let universe = builder.load_universe(source).expect("Failed to load");
///
/// let document = builder.export(&universe).expect("Failed to export");
/// assert_eq!(document.len(), 1);
///
/// let graph = builder.object_graph(&universe);
/// assert_eq!(graph.objects().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MetamodelBuilder {
    config: AppConfig,
}

impl MetamodelBuilder {
    /// Create a new builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Load a type universe from its TOML description.
    ///
    /// # Errors
    ///
    /// Returns [`MetascopeError::Universe`] for malformed input or a class
    /// described twice.
    pub fn load_universe(&self, source: &str) -> Result<TypeUniverse, MetascopeError> {
        info!("Loading type universe");
        let universe = TypeUniverse::from_toml_str(source)?;
        debug!(types = universe.len(); "Type universe loaded");
        Ok(universe)
    }

    /// Export the metamodel of `provider`.
    ///
    /// # Errors
    ///
    /// Returns [`MetascopeError::DuplicateLogicalTypes`] when two classes are
    /// exported under one logical type name.
    pub fn export<P: TypeProvider + ?Sized>(
        &self,
        provider: &P,
    ) -> Result<ExportDocument, MetascopeError> {
        MetamodelExporter::new(provider, self.config.export()).export()
    }

    /// Build the object graph of the entities of `provider`.
    ///
    /// Entities, and abstract types unless disabled in the graph section, are
    /// selected when their namespace matches the export namespace prefixes.
    pub fn object_graph<P: TypeProvider + ?Sized>(&self, provider: &P) -> ObjectGraph {
        let selection = self.graph_selection(provider);
        ObjectGraphFactory::new(provider, selection).create()
    }

    fn graph_selection<'a, P: TypeProvider + ?Sized>(
        &self,
        provider: &'a P,
    ) -> Vec<&'a TypeDescriptor> {
        let export = self.config.export();
        let include_abstract = self.config.graph().include_abstract();
        provider
            .all_types()
            .into_iter()
            .filter(|descriptor| {
                descriptor.is_entity() || (include_abstract && descriptor.is_abstract())
            })
            .filter(|descriptor| export.matches_namespace(&descriptor.namespace()))
            .collect()
    }
}
