//! The type descriptor provider interface and an in-memory implementation.
//!
//! The exporter and the graph factory only ever read descriptors through
//! [`TypeProvider`]. [`TypeUniverse`] is the provider used by the CLI and the
//! tests: it distinguishes *introspected* types, which are enumerated by
//! [`TypeProvider::all_types`], from *on-demand* types, which can be resolved
//! by class name but only show up once something references them.

use std::collections::{HashSet, VecDeque};

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};
use serde::Deserialize;
use thiserror::Error;

use crate::{descriptor::TypeDescriptor, identifier::Id};

/// Read-only access to a universe of type descriptors.
pub trait TypeProvider {
    /// Snapshot of every introspected descriptor, in registration order.
    fn all_types(&self) -> Vec<&TypeDescriptor>;

    /// Resolve a descriptor by its fully qualified class name.
    fn type_by_class(&self, class: Id) -> Option<&TypeDescriptor>;

    /// Every descriptor published under the given logical type name.
    fn types_by_logical_name(&self, logical_type: Id) -> Vec<&TypeDescriptor> {
        self.all_types()
            .into_iter()
            .filter(|descriptor| descriptor.logical_type() == logical_type)
            .collect()
    }

    /// Whether `subtype` is `supertype` or inherits from it, directly or indirectly.
    fn is_assignable_from(&self, supertype: Id, subtype: Id) -> bool {
        if supertype == subtype {
            return true;
        }

        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([subtype]);
        while let Some(class) = queue.pop_front() {
            if !visited.insert(class) {
                continue;
            }
            let Some(descriptor) = self.type_by_class(class) else {
                continue;
            };
            for parent in descriptor.direct_supertypes() {
                if parent == supertype {
                    return true;
                }
                queue.push_back(parent);
            }
        }
        false
    }

    /// Descriptors that name `class` as their superclass or as an interface.
    fn direct_subclasses(&self, class: Id) -> Vec<&TypeDescriptor> {
        self.all_types()
            .into_iter()
            .filter(|descriptor| descriptor.direct_supertypes().any(|parent| parent == class))
            .collect()
    }

    /// Descriptors that are assignable to `class`, excluding `class` itself.
    fn all_subclasses(&self, class: Id) -> Vec<&TypeDescriptor> {
        self.all_types()
            .into_iter()
            .filter(|descriptor| {
                descriptor.class() != class && self.is_assignable_from(class, descriptor.class())
            })
            .collect()
    }
}

/// Errors raised while assembling a [`TypeUniverse`].
#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("Class `{0}` is registered more than once")]
    DuplicateClass(Id),

    #[error("Failed to parse type universe: {0}")]
    Parse(String),
}

/// On-disk layout of a universe description.
#[derive(Debug, Default, Deserialize)]
struct UniverseFile {
    #[serde(default)]
    types: Vec<TypeDescriptor>,
    #[serde(default)]
    on_demand: Vec<TypeDescriptor>,
}

/// In-memory [`TypeProvider`].
///
/// # Examples
///
/// ```
/// use metascope_core::{
///     descriptor::{TypeDescriptor, TypeSort},
///     identifier::Id,
///     provider::{TypeProvider, TypeUniverse},
/// };
///
/// let mut universe = TypeUniverse::new();
/// universe
///     .register(TypeDescriptor::new(
///         Id::new("com.acme.Customer"),
///         Id::new("sales.Customer"),
///         TypeSort::Entity,
///     ))
///     .unwrap();
///
/// assert_eq!(universe.all_types().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct TypeUniverse {
    types: IndexMap<Id, TypeDescriptor>,
    introspected: IndexSet<Id>,
}

impl TypeUniverse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a universe from TOML.
    ///
    /// The document holds two arrays of tables: `types` (introspected) and
    /// `on_demand` (resolvable, not enumerated).
    ///
    /// # Errors
    ///
    /// Returns [`UniverseError::Parse`] for malformed TOML and
    /// [`UniverseError::DuplicateClass`] if a class appears twice.
    pub fn from_toml_str(source: &str) -> Result<Self, UniverseError> {
        let file: UniverseFile =
            toml::from_str(source).map_err(|err| UniverseError::Parse(err.to_string()))?;

        let mut universe = Self::new();
        for descriptor in file.types {
            universe.register(descriptor)?;
        }
        for descriptor in file.on_demand {
            universe.register_on_demand(descriptor)?;
        }

        debug!(
            introspected = universe.introspected.len(),
            total = universe.types.len();
            "Type universe loaded"
        );
        Ok(universe)
    }

    /// Register an introspected descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`UniverseError::DuplicateClass`] if the class is already known.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<(), UniverseError> {
        let class = descriptor.class();
        self.insert(descriptor)?;
        self.introspected.insert(class);
        Ok(())
    }

    /// Register a descriptor that is resolvable by class but not enumerated.
    ///
    /// # Errors
    ///
    /// Returns [`UniverseError::DuplicateClass`] if the class is already known.
    pub fn register_on_demand(&mut self, descriptor: TypeDescriptor) -> Result<(), UniverseError> {
        self.insert(descriptor)
    }

    fn insert(&mut self, descriptor: TypeDescriptor) -> Result<(), UniverseError> {
        let class = descriptor.class();
        if self.types.contains_key(&class) {
            return Err(UniverseError::DuplicateClass(class));
        }
        trace!(class:% = class; "Registering type");
        self.types.insert(class, descriptor);
        Ok(())
    }

    /// Number of resolvable descriptors, introspected or not.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeProvider for TypeUniverse {
    fn all_types(&self) -> Vec<&TypeDescriptor> {
        self.introspected
            .iter()
            .filter_map(|class| self.types.get(class))
            .collect()
    }

    fn type_by_class(&self, class: Id) -> Option<&TypeDescriptor> {
        self.types.get(&class)
    }

    fn types_by_logical_name(&self, logical_type: Id) -> Vec<&TypeDescriptor> {
        self.types
            .values()
            .filter(|descriptor| descriptor.logical_type() == logical_type)
            .collect()
    }

    fn direct_subclasses(&self, class: Id) -> Vec<&TypeDescriptor> {
        self.types
            .values()
            .filter(|descriptor| descriptor.direct_supertypes().any(|parent| parent == class))
            .collect()
    }

    fn all_subclasses(&self, class: Id) -> Vec<&TypeDescriptor> {
        self.types
            .values()
            .filter(|descriptor| {
                descriptor.class() != class && self.is_assignable_from(class, descriptor.class())
            })
            .collect()
    }
}
