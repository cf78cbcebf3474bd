//! Type descriptors and their members.
//!
//! A [`TypeDescriptor`] is the reflected description of one domain class: its
//! class name, the logical type name it is published under, classification
//! flags, supertypes, facets and members. Descriptors are produced by an
//! introspection pipeline outside of this crate and are read-only here.

use serde::{Deserialize, Serialize};

use crate::{
    facet::{Facet, FacetHolder},
    identifier::Id,
};

/// Broad classification of a domain type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeSort {
    /// Persistent domain object.
    Entity,
    /// Non-persistent domain object whose state is held by the client.
    ViewModel,
    /// Immutable value such as a string, number or date.
    Value,
    /// A container of other objects.
    Collection,
    /// Contributes members to another type.
    Mixin,
    /// Injectable domain service.
    Service,
    #[default]
    Unknown,
}

/// How a service is published. Only services with a nature contribute actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceNature {
    View,
    Rest,
}

/// Classification flags orthogonal to [`TypeSort`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeFlags {
    #[serde(rename = "abstract")]
    pub abstract_type: bool,
    pub interface: bool,
    #[serde(rename = "enum")]
    pub enum_type: bool,
    /// Shipped with the platform rather than declared by the application.
    pub builtin: bool,
}

/// Whether mixed-in members are part of a member listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixedIn {
    Included,
    Excluded,
}

impl MixedIn {
    fn admits(self, mixed_in: bool) -> bool {
        match self {
            Self::Included => true,
            Self::Excluded => !mixed_in,
        }
    }
}

/// Single-valued association.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    id: String,
    element_type: Id,
    #[serde(default)]
    mixed_in: bool,
    #[serde(default)]
    facets: Vec<Facet>,
}

impl Property {
    pub fn new(id: impl Into<String>, element_type: Id) -> Self {
        Self {
            id: id.into(),
            element_type,
            mixed_in: false,
            facets: Vec::new(),
        }
    }

    /// Mark the property as contributed by a mixin.
    pub fn mixed_in(mut self) -> Self {
        self.mixed_in = true;
        self
    }

    pub fn with_facet(mut self, facet: Facet) -> Self {
        self.facets.push(facet);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn element_type(&self) -> Id {
        self.element_type
    }

    pub fn is_mixed_in(&self) -> bool {
        self.mixed_in
    }
}

impl FacetHolder for Property {
    fn facets(&self) -> &[Facet] {
        &self.facets
    }
}

/// Multi-valued association.
///
/// `element_type` is the type of the elements, never the container type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    id: String,
    element_type: Id,
    #[serde(default)]
    mixed_in: bool,
    #[serde(default)]
    facets: Vec<Facet>,
}

impl Collection {
    pub fn new(id: impl Into<String>, element_type: Id) -> Self {
        Self {
            id: id.into(),
            element_type,
            mixed_in: false,
            facets: Vec::new(),
        }
    }

    pub fn mixed_in(mut self) -> Self {
        self.mixed_in = true;
        self
    }

    pub fn with_facet(mut self, facet: Facet) -> Self {
        self.facets.push(facet);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn element_type(&self) -> Id {
        self.element_type
    }

    pub fn is_mixed_in(&self) -> bool {
        self.mixed_in
    }
}

impl FacetHolder for Collection {
    fn facets(&self) -> &[Facet] {
        &self.facets
    }
}

/// A formal parameter of an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    id: String,
    element_type: Id,
    /// Accepts a collection of `element_type` rather than a single value.
    #[serde(default)]
    plural: bool,
    #[serde(default)]
    facets: Vec<Facet>,
}

impl Parameter {
    pub fn new(id: impl Into<String>, element_type: Id) -> Self {
        Self {
            id: id.into(),
            element_type,
            plural: false,
            facets: Vec::new(),
        }
    }

    pub fn plural(mut self) -> Self {
        self.plural = true;
        self
    }

    pub fn with_facet(mut self, facet: Facet) -> Self {
        self.facets.push(facet);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn element_type(&self) -> Id {
        self.element_type
    }

    pub fn is_plural(&self) -> bool {
        self.plural
    }
}

impl FacetHolder for Parameter {
    fn facets(&self) -> &[Facet] {
        &self.facets
    }
}

/// An invokable behavior of a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    id: String,
    return_type: Id,
    #[serde(default)]
    mixed_in: bool,
    #[serde(default)]
    parameters: Vec<Parameter>,
    #[serde(default)]
    facets: Vec<Facet>,
}

impl Action {
    pub fn new(id: impl Into<String>, return_type: Id) -> Self {
        Self {
            id: id.into(),
            return_type,
            mixed_in: false,
            parameters: Vec::new(),
            facets: Vec::new(),
        }
    }

    pub fn mixed_in(mut self) -> Self {
        self.mixed_in = true;
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_facet(mut self, facet: Facet) -> Self {
        self.facets.push(facet);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn return_type(&self) -> Id {
        self.return_type
    }

    pub fn is_mixed_in(&self) -> bool {
        self.mixed_in
    }

    /// Parameters in declaration order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

impl FacetHolder for Action {
    fn facets(&self) -> &[Facet] {
        &self.facets
    }
}

/// Either kind of association, as seen by code that treats them uniformly.
#[derive(Debug, Clone, Copy)]
pub enum Association<'a> {
    Property(&'a Property),
    Collection(&'a Collection),
}

impl Association<'_> {
    pub fn id(&self) -> &str {
        match self {
            Self::Property(property) => property.id(),
            Self::Collection(collection) => collection.id(),
        }
    }

    pub fn element_type(&self) -> Id {
        match self {
            Self::Property(property) => property.element_type(),
            Self::Collection(collection) => collection.element_type(),
        }
    }

    pub fn is_plural(&self) -> bool {
        matches!(self, Self::Collection(_))
    }

    pub fn is_mixed_in(&self) -> bool {
        match self {
            Self::Property(property) => property.is_mixed_in(),
            Self::Collection(collection) => collection.is_mixed_in(),
        }
    }
}

/// Reflected description of one domain type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Fully qualified class name, unique per descriptor.
    class: Id,
    /// Stable name the type is published under, `namespace.SimpleName`.
    logical_type: Id,
    #[serde(default)]
    sort: TypeSort,
    #[serde(default)]
    flags: TypeFlags,
    #[serde(default)]
    service_nature: Option<ServiceNature>,
    #[serde(default)]
    superclass: Option<Id>,
    #[serde(default)]
    interfaces: Vec<Id>,
    #[serde(default)]
    facets: Vec<Facet>,
    #[serde(default)]
    properties: Vec<Property>,
    #[serde(default)]
    collections: Vec<Collection>,
    #[serde(default)]
    actions: Vec<Action>,
}

impl TypeDescriptor {
    pub fn new(class: Id, logical_type: Id, sort: TypeSort) -> Self {
        Self {
            class,
            logical_type,
            sort,
            flags: TypeFlags::default(),
            service_nature: None,
            superclass: None,
            interfaces: Vec::new(),
            facets: Vec::new(),
            properties: Vec::new(),
            collections: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn with_flags(mut self, flags: TypeFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_service_nature(mut self, nature: ServiceNature) -> Self {
        self.service_nature = Some(nature);
        self
    }

    pub fn with_superclass(mut self, superclass: Id) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn with_interface(mut self, interface: Id) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_facet(mut self, facet: Facet) -> Self {
        self.facets.push(facet);
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_collection(mut self, collection: Collection) -> Self {
        self.collections.push(collection);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn class(&self) -> Id {
        self.class
    }

    pub fn logical_type(&self) -> Id {
        self.logical_type
    }

    /// Namespace of the logical type, e.g. `sales` for `sales.Customer`.
    pub fn namespace(&self) -> String {
        self.logical_type.namespace()
    }

    pub fn simple_name(&self) -> String {
        self.logical_type.simple_name()
    }

    pub fn sort(&self) -> TypeSort {
        self.sort
    }

    pub fn flags(&self) -> TypeFlags {
        self.flags
    }

    pub fn service_nature(&self) -> Option<ServiceNature> {
        self.service_nature
    }

    pub fn superclass(&self) -> Option<Id> {
        self.superclass
    }

    pub fn interfaces(&self) -> &[Id] {
        &self.interfaces
    }

    /// Superclass followed by implemented interfaces.
    pub fn direct_supertypes(&self) -> impl Iterator<Item = Id> + '_ {
        self.superclass.into_iter().chain(self.interfaces.iter().copied())
    }

    pub fn is_entity(&self) -> bool {
        self.sort == TypeSort::Entity
    }

    pub fn is_service(&self) -> bool {
        self.sort == TypeSort::Service
    }

    pub fn is_value(&self) -> bool {
        self.sort == TypeSort::Value
    }

    pub fn is_plural(&self) -> bool {
        self.sort == TypeSort::Collection
    }

    pub fn is_mixin(&self) -> bool {
        self.sort == TypeSort::Mixin
    }

    pub fn is_abstract(&self) -> bool {
        self.flags.abstract_type
    }

    pub fn is_interface(&self) -> bool {
        self.flags.interface
    }

    pub fn is_enum(&self) -> bool {
        self.flags.enum_type
    }

    /// A value type shipped with the platform.
    pub fn is_builtin_value(&self) -> bool {
        self.is_value() && self.flags.builtin
    }

    pub fn properties(&self, mixed_in: MixedIn) -> impl Iterator<Item = &Property> {
        self.properties
            .iter()
            .filter(move |property| mixed_in.admits(property.is_mixed_in()))
    }

    pub fn collections(&self, mixed_in: MixedIn) -> impl Iterator<Item = &Collection> {
        self.collections
            .iter()
            .filter(move |collection| mixed_in.admits(collection.is_mixed_in()))
    }

    pub fn actions(&self, mixed_in: MixedIn) -> impl Iterator<Item = &Action> {
        self.actions
            .iter()
            .filter(move |action| mixed_in.admits(action.is_mixed_in()))
    }

    /// Properties followed by collections.
    pub fn associations(&self, mixed_in: MixedIn) -> impl Iterator<Item = Association<'_>> {
        self.properties(mixed_in)
            .map(Association::Property)
            .chain(self.collections(mixed_in).map(Association::Collection))
    }
}

impl FacetHolder for TypeDescriptor {
    fn facets(&self) -> &[Facet] {
        &self.facets
    }
}
