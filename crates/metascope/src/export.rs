//! Metamodel export.
//!
//! [`MetamodelExporter`] walks the descriptors of a [`TypeProvider`] and
//! produces an [`ExportDocument`]: one [`DomainClassExport`] per type with its
//! facets, properties, collections and actions.
//!
//! # Pipeline
//!
//! ```text
//! Phase 0   every namespace prefix names exactly one concrete type?
//!               yes: export just those types, skip to sorting
//! Phase 1   create a record for every introspected descriptor
//! Phase 2   populate facets and members until no unpopulated record is left
//!           (members may reference types not seen yet, which adds records)
//! Phase 2.5 reject two classes exported under one logical type name
//! Phase 3   apply the inclusion policy, then sort
//! ```
//!
//! The result is fully ordered (records by id, members by id, facets by
//! facet type, attributes by name), so identical inputs serialize to
//! identical output.

mod annotator;
mod attribute;
mod document;

pub use annotator::{
    Annotator, AnnotatorChain, SHADOWED, ShadowedFacetAnnotator, TITLE, TitleAnnotator,
};
pub use attribute::{PRECEDENCE_ATTRIBUTE, render_attribute, render_facet_attributes};
pub use document::{
    ActionExport, Annotatable, Annotation, AssociationExport, CollectionExport,
    DomainClassExport, ExportDocument, FacetAttrExport, FacetExport, ParamDetails, ParamExport,
    PropertyExport,
};

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, info, trace, warn};

use metascope_core::{
    descriptor::{MixedIn, TypeDescriptor},
    facet::FacetHolder,
    identifier::Id,
    provider::TypeProvider,
};

use crate::{
    config::ExportConfig,
    error::{DuplicateLogicalTypes, DuplicateMapping, MetascopeError},
};

/// Exports the metamodel held by a [`TypeProvider`].
///
/// The exporter itself is stateless; every call to [`export`](Self::export)
/// works on fresh, call-local state.
///
/// # Examples
///
/// ```
/// use metascope::{config::ExportConfig, export::MetamodelExporter};
/// use metascope_core::{
///     descriptor::{TypeDescriptor, TypeSort},
///     identifier::Id,
///     provider::TypeUniverse,
/// };
///
/// let mut universe = TypeUniverse::new();
/// universe
///     .register(TypeDescriptor::new(
///         Id::new("com.acme.Account"),
///         Id::new("sales.Account"),
///         TypeSort::Entity,
///     ))
///     .unwrap();
///
/// let config = ExportConfig::default();
/// let document = MetamodelExporter::new(&universe, &config).export().unwrap();
/// assert_eq!(document.len(), 1);
/// ```
pub struct MetamodelExporter<'a, P: TypeProvider + ?Sized> {
    provider: &'a P,
    config: &'a ExportConfig,
    annotators: AnnotatorChain,
}

impl<'a, P: TypeProvider + ?Sized> MetamodelExporter<'a, P> {
    /// Create an exporter whose annotators follow `config`.
    pub fn new(provider: &'a P, config: &'a ExportConfig) -> Self {
        Self {
            provider,
            config,
            annotators: AnnotatorChain::from_config(config),
        }
    }

    /// Replace the annotator chain derived from the configuration.
    pub fn with_annotators(mut self, annotators: AnnotatorChain) -> Self {
        self.annotators = annotators;
        self
    }

    /// Run the export.
    ///
    /// # Errors
    ///
    /// Returns [`MetascopeError::DuplicateLogicalTypes`] if two different
    /// classes, the first of which is not an enum, are exported under the
    /// same logical type name. No partial document is produced in that case.
    pub fn export(&self) -> Result<ExportDocument, MetascopeError> {
        let mut run = ExportRun::new(self.provider, self.config, &self.annotators);

        if let Some(tiny_domain) = self.tiny_domain() {
            info!(types = tiny_domain.len(); "Exporting tiny domain");
            return Ok(run.export_tiny_domain(&tiny_domain));
        }

        info!(
            prefixes:? = self.config.namespace_prefixes();
            "Exporting metamodel"
        );

        // Phase 1
        for descriptor in self.provider.all_types() {
            run.lookup_or_create(descriptor);
        }
        debug!(records = run.records.len(); "Records created");

        // Phase 2
        run.populate_all();
        debug!(records = run.records.len(); "Records populated");

        // Phase 2.5
        run.check_duplicates()?;

        // Phase 3
        let document = run.into_document();
        info!(records = document.len(); "Metamodel exported");
        Ok(document)
    }

    /// Resolve every namespace prefix as a logical type name.
    ///
    /// Returns the resolved descriptors only if each prefix names exactly one
    /// descriptor that is neither abstract nor an interface.
    fn tiny_domain(&self) -> Option<Vec<&'a TypeDescriptor>> {
        let prefixes = self.config.namespace_prefixes();
        if prefixes.is_empty() || self.config.is_any_namespace() {
            return None;
        }

        prefixes
            .iter()
            .map(|prefix| {
                let candidates = self.provider.types_by_logical_name(Id::new(prefix));
                match candidates.as_slice() {
                    [descriptor] if !descriptor.is_abstract() && !descriptor.is_interface() => {
                        Some(*descriptor)
                    }
                    _ => None,
                }
            })
            .collect()
    }
}

/// Call-local state of one export.
struct ExportRun<'a, P: TypeProvider + ?Sized> {
    provider: &'a P,
    config: &'a ExportConfig,
    annotators: &'a AnnotatorChain,
    /// Records keyed by class, in creation order.
    records: IndexMap<Id, DomainClassExport>,
    descriptors: IndexMap<Id, &'a TypeDescriptor>,
    /// Classes whose facets and members are populated.
    processed: HashSet<Id>,
}

impl<'a, P: TypeProvider + ?Sized> ExportRun<'a, P> {
    fn new(provider: &'a P, config: &'a ExportConfig, annotators: &'a AnnotatorChain) -> Self {
        Self {
            provider,
            config,
            annotators,
            records: IndexMap::new(),
            descriptors: IndexMap::new(),
            processed: HashSet::new(),
        }
    }

    fn export_tiny_domain(&mut self, descriptors: &[&'a TypeDescriptor]) -> ExportDocument {
        let mut classes = Vec::new();
        for &descriptor in descriptors {
            self.lookup_or_create(descriptor);
            if self.processed.insert(descriptor.class()) {
                self.populate(descriptor);
                classes.push(descriptor.class());
            }
        }

        let records = classes
            .iter()
            .filter_map(|class| self.records.swap_remove(class))
            .collect();
        ExportDocument::new(records)
    }

    /// Return the logical type name of `descriptor`, creating its record on first sight.
    fn lookup_or_create(&mut self, descriptor: &'a TypeDescriptor) -> Id {
        let class = descriptor.class();
        if !self.records.contains_key(&class) {
            trace!(class:% = class; "Creating record");
            let mut record =
                DomainClassExport::new(descriptor.logical_type(), descriptor.is_service());
            self.annotators.annotate_type(descriptor, &mut record);
            self.records.insert(class, record);
            self.descriptors.insert(class, descriptor);
        }
        descriptor.logical_type()
    }

    /// Resolve a referenced class to its logical type name, creating its record if needed.
    ///
    /// A class the provider does not know is referenced by its own name.
    fn resolve(&mut self, class: Id, referrer: &str) -> Id {
        match self.provider.type_by_class(class) {
            Some(descriptor) => self.lookup_or_create(descriptor),
            None => {
                warn!(class:% = class, member = referrer; "Unresolvable member type");
                class
            }
        }
    }

    /// Populate records until every record, including those discovered on the way, is processed.
    fn populate_all(&mut self) {
        loop {
            let pending: Vec<&'a TypeDescriptor> = self
                .descriptors
                .values()
                .filter(|descriptor| !self.processed.contains(&descriptor.class()))
                .copied()
                .collect();
            if pending.is_empty() {
                break;
            }

            trace!(pending = pending.len(); "Populating records");
            for descriptor in pending {
                self.processed.insert(descriptor.class());
                self.populate(descriptor);
            }
        }
    }

    fn populate(&mut self, descriptor: &'a TypeDescriptor) {
        let facets = self.facet_exports(descriptor);
        if let Some(record) = self.records.get_mut(&descriptor.class()) {
            record.set_facets(facets);
        }

        if descriptor.is_value() || descriptor.is_plural() || descriptor.is_enum() {
            return;
        }

        let (properties, collections) = if descriptor.is_service() {
            (Vec::new(), Vec::new())
        } else {
            (self.property_exports(descriptor), self.collection_exports(descriptor))
        };
        let actions = if !descriptor.is_service() || descriptor.service_nature().is_some() {
            self.action_exports(descriptor)
        } else {
            Vec::new()
        };

        if let Some(record) = self.records.get_mut(&descriptor.class()) {
            record.set_members(properties, collections, actions);
        }
    }

    fn facet_exports(&self, holder: &impl FacetHolder) -> Vec<FacetExport> {
        holder
            .facets()
            .iter()
            .filter(|facet| {
                !(self.config.ignore_fallback_facets() && facet.precedence().is_fallback())
            })
            .map(|facet| {
                let mut export = FacetExport::new(
                    facet.facet_type(),
                    facet.implementation(),
                    render_facet_attributes(facet),
                );
                self.annotators.annotate_facet(facet, &mut export);
                export
            })
            .collect()
    }

    fn property_exports(&mut self, descriptor: &'a TypeDescriptor) -> Vec<PropertyExport> {
        let mut exports = Vec::new();
        for property in descriptor.properties(MixedIn::Included) {
            let element_type = self.resolve(property.element_type(), property.id());
            let facets = self.facet_exports(property);
            let mut export =
                PropertyExport::new(property.id(), property.is_mixed_in(), element_type, facets);
            self.annotators.annotate_property(property, &mut export);
            exports.push(export);
        }
        exports
    }

    fn collection_exports(&mut self, descriptor: &'a TypeDescriptor) -> Vec<CollectionExport> {
        let mut exports = Vec::new();
        for collection in descriptor.collections(MixedIn::Included) {
            let element_type = self.resolve(collection.element_type(), collection.id());
            let facets = self.facet_exports(collection);
            let mut export = CollectionExport::new(
                collection.id(),
                collection.is_mixed_in(),
                element_type,
                facets,
            );
            self.annotators.annotate_collection(collection, &mut export);
            exports.push(export);
        }
        exports
    }

    fn action_exports(&mut self, descriptor: &'a TypeDescriptor) -> Vec<ActionExport> {
        let mut exports = Vec::new();
        for action in descriptor.actions(MixedIn::Included) {
            let return_type = self.resolve(action.return_type(), action.id());
            let facets = self.facet_exports(action);

            let mut parameters = Vec::with_capacity(action.parameters().len());
            for parameter in action.parameters() {
                let element_type = self.resolve(parameter.element_type(), parameter.id());
                let mut export = ParamExport::new(
                    parameter.id(),
                    parameter.is_plural(),
                    element_type,
                    self.facet_exports(parameter),
                );
                self.annotators.annotate_parameter(parameter, &mut export);
                parameters.push(export);
            }

            let mut export = ActionExport::new(
                action.id(),
                action.is_mixed_in(),
                return_type,
                facets,
                parameters,
            );
            self.annotators.annotate_action(action, &mut export);
            exports.push(export);
        }
        exports
    }

    /// Fail if two different classes produced records with the same id.
    ///
    /// The earlier class wins the id; the pair is only a conflict if that
    /// earlier class is not an enum.
    fn check_duplicates(&self) -> Result<(), DuplicateLogicalTypes> {
        let mut owners: IndexMap<Id, &TypeDescriptor> = IndexMap::new();
        let mut conflicts = Vec::new();

        for (class, record) in &self.records {
            let descriptor = self.descriptors[class];
            match owners.get(&record.id()) {
                None => {
                    owners.insert(record.id(), descriptor);
                }
                Some(first) if first.class() != descriptor.class() && !first.is_enum() => {
                    conflicts.push(DuplicateMapping::new(
                        record.id(),
                        first.class(),
                        descriptor.class(),
                    ));
                }
                Some(_) => {}
            }
        }

        if conflicts.is_empty() {
            Ok(())
        } else {
            warn!(conflicts = conflicts.len(); "Duplicate logical type names");
            Err(DuplicateLogicalTypes::new(conflicts))
        }
    }

    fn is_included(&self, descriptor: &TypeDescriptor) -> bool {
        let config = self.config;
        if !config.matches_namespace(&descriptor.namespace()) {
            return false;
        }
        let ignored = (config.ignore_mixins() && descriptor.is_mixin())
            || (config.ignore_interfaces() && descriptor.is_interface())
            || (config.ignore_abstract_classes() && descriptor.is_abstract())
            || (config.ignore_builtin_value_types() && descriptor.is_builtin_value());
        !ignored
    }

    /// Apply the inclusion policy to a snapshot of the index.
    ///
    /// Records sharing an id with an earlier record (tolerated enum
    /// duplicates) are dropped, so ids stay unique within the document.
    fn into_document(mut self) -> ExportDocument {
        let snapshot: Vec<&'a TypeDescriptor> = self.descriptors.values().copied().collect();

        let mut included = Vec::new();
        let mut seen_ids = HashSet::new();
        for descriptor in snapshot {
            if !self.is_included(descriptor) {
                trace!(class:% = descriptor.class(); "Excluded by inclusion policy");
                continue;
            }
            let Some(record) = self.records.swap_remove(&descriptor.class()) else {
                continue;
            };
            if seen_ids.insert(record.id()) {
                included.push(record);
            }
        }
        ExportDocument::new(included)
    }
}


#[cfg(test)]
mod proptest_tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::*;
    use metascope_core::{
        descriptor::{Collection, Property, TypeFlags, TypeSort},
        provider::TypeUniverse,
    };

    // ===================
    // Strategies
    // ===================

    /// Shape of one generated type: sort, mixin/abstract flags and member targets.
    type TypeShape = (TypeSort, bool, Vec<usize>, Vec<usize>);

    fn sort_strategy() -> impl Strategy<Value = TypeSort> {
        prop_oneof![
            Just(TypeSort::Entity),
            Just(TypeSort::ViewModel),
            Just(TypeSort::Value),
            Just(TypeSort::Mixin),
        ]
    }

    fn shapes_strategy() -> impl Strategy<Value = Vec<TypeShape>> {
        prop::collection::vec(
            (
                sort_strategy(),
                any::<bool>(),
                prop::collection::vec(0usize..8, 0..3),
                prop::collection::vec(0usize..8, 0..2),
            ),
            1..8,
        )
    }

    fn descriptor(index: usize, shapes: &[TypeShape]) -> TypeDescriptor {
        let (sort, abstract_type, properties, collections) = &shapes[index];
        let class = |target: usize| Id::new(&format!("com.acme.ns{}.T{target}", target % 3));

        let mut descriptor = TypeDescriptor::new(
            class(index),
            Id::new(&format!("ns{}.T{index}", index % 3)),
            *sort,
        )
        .with_flags(TypeFlags {
            abstract_type: *abstract_type,
            ..TypeFlags::default()
        });
        for (position, target) in properties.iter().enumerate() {
            let target = target % shapes.len();
            descriptor =
                descriptor.with_property(Property::new(format!("p{position}"), class(target)));
        }
        for (position, target) in collections.iter().enumerate() {
            let target = target % shapes.len();
            descriptor =
                descriptor.with_collection(Collection::new(format!("c{position}"), class(target)));
        }
        descriptor
    }

    fn universe(shapes: &[TypeShape], order: &[usize]) -> TypeUniverse {
        let mut universe = TypeUniverse::new();
        for &index in order {
            universe
                .register(descriptor(index, shapes))
                .expect("classes are unique");
        }
        universe
    }

    fn shapes_and_order_strategy() -> impl Strategy<Value = (Vec<TypeShape>, Vec<usize>)> {
        shapes_strategy().prop_flat_map(|shapes| {
            let order: Vec<usize> = (0..shapes.len()).collect();
            (Just(shapes), Just(order).prop_shuffle())
        })
    }

    fn record_ids(document: &ExportDocument) -> BTreeSet<String> {
        document
            .domain_classes()
            .iter()
            .map(|record| record.id().to_string())
            .collect()
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Two runs over the same universe and configuration give equal documents.
    fn check_export_is_deterministic(shapes: &[TypeShape]) -> Result<(), TestCaseError> {
        let order: Vec<usize> = (0..shapes.len()).collect();
        let universe = universe(shapes, &order);
        let config = ExportConfig::default().with_title_annotations(true);
        let exporter = MetamodelExporter::new(&universe, &config);

        let first = exporter.export().map_err(|err| TestCaseError::fail(err.to_string()))?;
        let second = exporter.export().map_err(|err| TestCaseError::fail(err.to_string()))?;
        prop_assert_eq!(first, second);
        Ok(())
    }

    /// The document does not depend on the order types were introspected in.
    fn check_export_ignores_introspection_order(
        shapes: &[TypeShape],
        order: &[usize],
    ) -> Result<(), TestCaseError> {
        let natural: Vec<usize> = (0..shapes.len()).collect();
        let config = ExportConfig::default();

        let expected = MetamodelExporter::new(&universe(shapes, &natural), &config)
            .export()
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        let shuffled = MetamodelExporter::new(&universe(shapes, order), &config)
            .export()
            .map_err(|err| TestCaseError::fail(err.to_string()))?;
        prop_assert_eq!(expected, shuffled);
        Ok(())
    }

    /// Ignoring mixins removes all and only the mixin records.
    fn check_ignore_mixins_removes_only_mixins(
        shapes: &[TypeShape],
        order: &[usize],
    ) -> Result<(), TestCaseError> {
        let universe = universe(shapes, order);

        let full = ExportConfig::default();
        let filtered = ExportConfig::default().with_ignore_mixins(true);
        let all_ids = record_ids(
            &MetamodelExporter::new(&universe, &full)
                .export()
                .map_err(|err| TestCaseError::fail(err.to_string()))?,
        );
        let kept_ids = record_ids(
            &MetamodelExporter::new(&universe, &filtered)
                .export()
                .map_err(|err| TestCaseError::fail(err.to_string()))?,
        );

        let mixin_ids: BTreeSet<String> = universe
            .all_types()
            .into_iter()
            .filter(|descriptor| descriptor.is_mixin())
            .map(|descriptor| descriptor.logical_type().to_string())
            .collect();
        let expected: BTreeSet<String> = all_ids.difference(&mixin_ids).cloned().collect();
        prop_assert_eq!(kept_ids, expected);
        Ok(())
    }

    // ===================
    // Property Tests
    // ===================

    proptest! {
        #[test]
        fn export_is_deterministic(shapes in shapes_strategy()) {
            check_export_is_deterministic(&shapes)?;
        }

        #[test]
        fn export_ignores_introspection_order((shapes, order) in shapes_and_order_strategy()) {
            check_export_ignores_introspection_order(&shapes, &order)?;
        }

        #[test]
        fn ignore_mixins_removes_only_mixins((shapes, order) in shapes_and_order_strategy()) {
            check_ignore_mixins_removes_only_mixins(&shapes, &order)?;
        }
    }
}
