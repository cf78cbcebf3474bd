//! Annotators that enrich exported elements with auxiliary labels.
//!
//! An [`Annotator`] is visited once for every element the exporter creates.
//! Annotators only ever append [`Annotation`](crate::export::Annotation)s;
//! they cannot fail, and an annotator with nothing to say adds nothing.
//!
//! The active set is assembled once per export run into an
//! [`AnnotatorChain`] from the [`ExportConfig`] switches.

use std::fmt;

use log::trace;

use metascope_core::{
    descriptor::{Action, Collection, Parameter, Property, TypeDescriptor},
    facet::Facet,
};

use crate::{
    config::ExportConfig,
    export::{
        attribute::{PRECEDENCE_ATTRIBUTE, render_facet_attributes},
        document::{
            ActionExport, Annotatable, CollectionExport, DomainClassExport, FacetExport,
            ParamExport, PropertyExport,
        },
    },
};

/// Annotation name used by [`TitleAnnotator`].
pub const TITLE: &str = "@title";

/// Annotation name used by [`ShadowedFacetAnnotator`].
pub const SHADOWED: &str = "@shadowed";

/// Visitor over every kind of exported element.
///
/// All methods default to doing nothing, so an annotator only implements the
/// element kinds it cares about.
pub trait Annotator: fmt::Debug {
    fn annotate_type(&self, _descriptor: &TypeDescriptor, _export: &mut DomainClassExport) {}

    fn annotate_property(&self, _property: &Property, _export: &mut PropertyExport) {}

    fn annotate_collection(&self, _collection: &Collection, _export: &mut CollectionExport) {}

    fn annotate_action(&self, _action: &Action, _export: &mut ActionExport) {}

    fn annotate_parameter(&self, _parameter: &Parameter, _export: &mut ParamExport) {}

    fn annotate_facet(&self, _facet: &Facet, _export: &mut FacetExport) {}
}

/// Ordered list of active annotators, itself usable as an [`Annotator`].
#[derive(Debug, Default)]
pub struct AnnotatorChain {
    annotators: Vec<Box<dyn Annotator>>,
}

impl AnnotatorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble the chain requested by `config`: titles first, then shadowed facets.
    pub fn from_config(config: &ExportConfig) -> Self {
        let mut chain = Self::new();
        if config.include_title_annotations() {
            chain.push(TitleAnnotator);
        }
        if config.include_shadowed_facets() {
            chain.push(ShadowedFacetAnnotator::default());
        }
        trace!(annotators = chain.len(); "Annotator chain assembled");
        chain
    }

    pub fn push(&mut self, annotator: impl Annotator + 'static) {
        self.annotators.push(Box::new(annotator));
    }

    pub fn len(&self) -> usize {
        self.annotators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotators.is_empty()
    }
}

impl Annotator for AnnotatorChain {
    fn annotate_type(&self, descriptor: &TypeDescriptor, export: &mut DomainClassExport) {
        for annotator in &self.annotators {
            annotator.annotate_type(descriptor, export);
        }
    }

    fn annotate_property(&self, property: &Property, export: &mut PropertyExport) {
        for annotator in &self.annotators {
            annotator.annotate_property(property, export);
        }
    }

    fn annotate_collection(&self, collection: &Collection, export: &mut CollectionExport) {
        for annotator in &self.annotators {
            annotator.annotate_collection(collection, export);
        }
    }

    fn annotate_action(&self, action: &Action, export: &mut ActionExport) {
        for annotator in &self.annotators {
            annotator.annotate_action(action, export);
        }
    }

    fn annotate_parameter(&self, parameter: &Parameter, export: &mut ParamExport) {
        for annotator in &self.annotators {
            annotator.annotate_parameter(parameter, export);
        }
    }

    fn annotate_facet(&self, facet: &Facet, export: &mut FacetExport) {
        for annotator in &self.annotators {
            annotator.annotate_facet(facet, export);
        }
    }
}

/// Adds a human-readable `@title` to every element.
///
/// Class names are abbreviated (`com.acme.sales.Customer` becomes
/// `c.a.s.Customer`); member titles combine the member id with the
/// abbreviated logical name of its type.
#[derive(Debug, Default, Clone, Copy)]
pub struct TitleAnnotator;

impl Annotator for TitleAnnotator {
    fn annotate_type(&self, descriptor: &TypeDescriptor, export: &mut DomainClassExport) {
        export.annotate(TITLE, descriptor.class().abbreviated());
    }

    fn annotate_property(&self, property: &Property, export: &mut PropertyExport) {
        let title = format!("{}: {}", property.id(), export.element_type().abbreviated());
        export.annotate(TITLE, title);
    }

    fn annotate_collection(&self, collection: &Collection, export: &mut CollectionExport) {
        let title = format!("{}: {}", collection.id(), export.element_type().abbreviated());
        export.annotate(TITLE, title);
    }

    fn annotate_action(&self, action: &Action, export: &mut ActionExport) {
        let title = format!("{}(): {}", action.id(), export.return_type().abbreviated());
        export.annotate(TITLE, title);
    }

    fn annotate_parameter(&self, parameter: &Parameter, export: &mut ParamExport) {
        let title = format!("{}: {}", parameter.id(), export.element_type().abbreviated());
        export.annotate(TITLE, title);
    }

    fn annotate_facet(&self, facet: &Facet, export: &mut FacetExport) {
        export.annotate(TITLE, facet.implementation().abbreviated());
    }
}

/// Reports the attributes of facets that lost the precedence ranking.
///
/// For every runner-up in a facet's shared ranking, each rendered attribute
/// is attached as a `@shadowed` annotation to the winner's attribute of the
/// same name, as `<value> (from <abbreviated implementation>)`. Attributes the
/// winner does not have are attached to the winning facet itself under
/// `@shadowed:<name>`. The top-ranked entry is the winner and is skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShadowedFacetAnnotator {
    annotate_precedence: bool,
}

impl ShadowedFacetAnnotator {
    /// Also report runner-up precedences. Off by default.
    pub fn with_precedence(mut self, annotate_precedence: bool) -> Self {
        self.annotate_precedence = annotate_precedence;
        self
    }
}

impl Annotator for ShadowedFacetAnnotator {
    fn annotate_facet(&self, facet: &Facet, export: &mut FacetExport) {
        for runner_up in facet.ranked_candidates().into_iter().skip(1) {
            let provenance = runner_up.implementation().abbreviated();
            for attr in render_facet_attributes(runner_up) {
                if attr.name() == PRECEDENCE_ATTRIBUTE && !self.annotate_precedence {
                    continue;
                }
                let value = format!("{} (from {provenance})", attr.value());
                match export.attribute_mut(attr.name()) {
                    Some(target) => target.annotate(SHADOWED, value),
                    None => export.annotate(format!("{SHADOWED}:{}", attr.name()), value),
                }
            }
        }
    }
}
