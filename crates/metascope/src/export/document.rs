//! The export document: one record per domain type plus its members.
//!
//! Every element can carry [`Annotation`]s, which never influence identity
//! or ordering. Ordering is applied by [`DomainClassExport::sort_members`]
//! and [`ExportDocument::new`] so that two runs over the same universe
//! serialize byte for byte identically.

use serde::Serialize;

use metascope_core::identifier::Id;

/// Auxiliary name/value label, e.g. `@title`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    name: String,
    value: String,
}

impl Annotation {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// An export element that annotators may enrich.
pub trait Annotatable {
    fn annotations(&self) -> &[Annotation];

    fn annotations_mut(&mut self) -> &mut Vec<Annotation>;

    /// Create an annotation and append it to the element.
    fn annotate(&mut self, name: impl Into<String>, value: impl Into<String>)
    where
        Self: Sized,
    {
        self.annotations_mut().push(Annotation::new(name, value));
    }

    /// Value of the first annotation with the given name.
    fn annotation(&self, name: &str) -> Option<&str> {
        self.annotations()
            .iter()
            .find(|annotation| annotation.name() == name)
            .map(Annotation::value)
    }
}

macro_rules! impl_annotatable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Annotatable for $ty {
                fn annotations(&self) -> &[Annotation] {
                    &self.annotations
                }

                fn annotations_mut(&mut self) -> &mut Vec<Annotation> {
                    &mut self.annotations
                }
            }
        )+
    };
}

/// One rendered facet attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetAttrExport {
    name: String,
    value: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    annotations: Vec<Annotation>,
}

impl FacetAttrExport {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            annotations: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A rendered facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetExport {
    facet_type: Id,
    implementation: Id,
    attributes: Vec<FacetAttrExport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    annotations: Vec<Annotation>,
}

impl FacetExport {
    /// Create a facet export; attributes are sorted by name.
    pub fn new(facet_type: Id, implementation: Id, mut attributes: Vec<FacetAttrExport>) -> Self {
        attributes.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            facet_type,
            implementation,
            attributes,
            annotations: Vec::new(),
        }
    }

    pub fn facet_type(&self) -> Id {
        self.facet_type
    }

    pub fn implementation(&self) -> Id {
        self.implementation
    }

    pub fn attributes(&self) -> &[FacetAttrExport] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&FacetAttrExport> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut FacetAttrExport> {
        self.attributes.iter_mut().find(|attr| attr.name == name)
    }
}

fn sort_facets(facets: &mut [FacetExport]) {
    facets.sort_by_cached_key(|facet| facet.facet_type.to_string());
}

/// Shared shape of properties and collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssociationExport {
    id: String,
    mixed_in: bool,
    /// Logical type name of the element type.
    element_type: Id,
    facets: Vec<FacetExport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    annotations: Vec<Annotation>,
}

impl AssociationExport {
    pub fn new(
        id: impl Into<String>,
        mixed_in: bool,
        element_type: Id,
        mut facets: Vec<FacetExport>,
    ) -> Self {
        sort_facets(&mut facets);
        Self {
            id: id.into(),
            mixed_in,
            element_type,
            facets,
            annotations: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_mixed_in(&self) -> bool {
        self.mixed_in
    }

    pub fn element_type(&self) -> Id {
        self.element_type
    }

    pub fn facets(&self) -> &[FacetExport] {
        &self.facets
    }
}

pub type PropertyExport = AssociationExport;
pub type CollectionExport = AssociationExport;

/// Payload shared by both parameter variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamDetails {
    id: String,
    element_type: Id,
    facets: Vec<FacetExport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    annotations: Vec<Annotation>,
}

/// An action parameter, single-valued (`Scalar`) or collection-valued (`Vector`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParamExport {
    Scalar(ParamDetails),
    Vector(ParamDetails),
}

impl ParamExport {
    pub fn new(
        id: impl Into<String>,
        plural: bool,
        element_type: Id,
        mut facets: Vec<FacetExport>,
    ) -> Self {
        sort_facets(&mut facets);
        let details = ParamDetails {
            id: id.into(),
            element_type,
            facets,
            annotations: Vec::new(),
        };
        if plural {
            Self::Vector(details)
        } else {
            Self::Scalar(details)
        }
    }

    fn details(&self) -> &ParamDetails {
        match self {
            Self::Scalar(details) | Self::Vector(details) => details,
        }
    }

    fn details_mut(&mut self) -> &mut ParamDetails {
        match self {
            Self::Scalar(details) | Self::Vector(details) => details,
        }
    }

    pub fn id(&self) -> &str {
        &self.details().id
    }

    pub fn element_type(&self) -> Id {
        self.details().element_type
    }

    pub fn facets(&self) -> &[FacetExport] {
        &self.details().facets
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, Self::Vector(_))
    }
}

impl Annotatable for ParamExport {
    fn annotations(&self) -> &[Annotation] {
        &self.details().annotations
    }

    fn annotations_mut(&mut self) -> &mut Vec<Annotation> {
        &mut self.details_mut().annotations
    }
}

/// An exported action with its parameters in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionExport {
    id: String,
    mixed_in: bool,
    /// Logical type name of the return type.
    return_type: Id,
    facets: Vec<FacetExport>,
    parameters: Vec<ParamExport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    annotations: Vec<Annotation>,
}

impl ActionExport {
    pub fn new(
        id: impl Into<String>,
        mixed_in: bool,
        return_type: Id,
        mut facets: Vec<FacetExport>,
        parameters: Vec<ParamExport>,
    ) -> Self {
        sort_facets(&mut facets);
        Self {
            id: id.into(),
            mixed_in,
            return_type,
            facets,
            parameters,
            annotations: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_mixed_in(&self) -> bool {
        self.mixed_in
    }

    pub fn return_type(&self) -> Id {
        self.return_type
    }

    pub fn facets(&self) -> &[FacetExport] {
        &self.facets
    }

    pub fn parameters(&self) -> &[ParamExport] {
        &self.parameters
    }
}

/// The exported representation of exactly one type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainClassExport {
    /// Logical type name; unique within a document.
    id: Id,
    service: bool,
    facets: Vec<FacetExport>,
    properties: Vec<PropertyExport>,
    collections: Vec<CollectionExport>,
    actions: Vec<ActionExport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    annotations: Vec<Annotation>,
}

impl DomainClassExport {
    pub fn new(id: Id, service: bool) -> Self {
        Self {
            id,
            service,
            facets: Vec::new(),
            properties: Vec::new(),
            collections: Vec::new(),
            actions: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn is_service(&self) -> bool {
        self.service
    }

    pub fn facets(&self) -> &[FacetExport] {
        &self.facets
    }

    pub fn properties(&self) -> &[PropertyExport] {
        &self.properties
    }

    pub fn collections(&self) -> &[CollectionExport] {
        &self.collections
    }

    pub fn actions(&self) -> &[ActionExport] {
        &self.actions
    }

    pub(crate) fn set_facets(&mut self, facets: Vec<FacetExport>) {
        self.facets = facets;
    }

    pub(crate) fn set_members(
        &mut self,
        properties: Vec<PropertyExport>,
        collections: Vec<CollectionExport>,
        actions: Vec<ActionExport>,
    ) {
        self.properties = properties;
        self.collections = collections;
        self.actions = actions;
    }

    /// Sort facets by facet type and each member list by member id.
    ///
    /// Action parameters keep their declaration order.
    pub fn sort_members(&mut self) {
        sort_facets(&mut self.facets);
        self.properties.sort_by(|a, b| a.id.cmp(&b.id));
        self.collections.sort_by(|a, b| a.id.cmp(&b.id));
        self.actions.sort_by(|a, b| a.id.cmp(&b.id));
    }
}

impl_annotatable!(
    FacetAttrExport,
    FacetExport,
    AssociationExport,
    ActionExport,
    DomainClassExport,
);

/// The ordered result of an export run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportDocument {
    domain_classes: Vec<DomainClassExport>,
}

impl ExportDocument {
    /// Build a document, sorting records by id and the members of each record.
    pub fn new(mut domain_classes: Vec<DomainClassExport>) -> Self {
        for domain_class in &mut domain_classes {
            domain_class.sort_members();
        }
        domain_classes.sort_by_cached_key(|domain_class| domain_class.id.to_string());
        Self { domain_classes }
    }

    pub fn domain_classes(&self) -> &[DomainClassExport] {
        &self.domain_classes
    }

    /// Look up a record by its logical type name.
    pub fn domain_class(&self, id: &str) -> Option<&DomainClassExport> {
        self.domain_classes
            .iter()
            .find(|domain_class| domain_class.id == id)
    }

    pub fn len(&self) -> usize {
        self.domain_classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domain_classes.is_empty()
    }
}
