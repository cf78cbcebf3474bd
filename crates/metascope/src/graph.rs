//! Object graph derivation.
//!
//! [`ObjectGraphFactory`] turns a selection of type descriptors into an
//! [`ObjectGraph`]: one node per logical type, association relations between
//! nodes of the same namespace, and inheritance relations reduced so that an
//! edge implied by a two-hop path is left out.
//!
//! The factory is consumed by [`ObjectGraphFactory::create`]; building a
//! second graph requires a second factory.

mod object_graph;

pub use object_graph::{GraphField, GraphNode, GraphRelation, ObjectGraph, RelationKind};

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, info, trace};

use metascope_core::{
    descriptor::{MixedIn, TypeDescriptor},
    identifier::Id,
    provider::TypeProvider,
};

/// Stereotype given to nodes of abstract types.
pub const ABSTRACT_STEREOTYPE: &str = "abstract";

/// Single-use builder of an [`ObjectGraph`].
///
/// # Examples
///
/// ```
/// use metascope::graph::{ObjectGraphFactory, RelationKind};
/// use metascope_core::{
///     descriptor::{Property, TypeDescriptor, TypeSort},
///     identifier::Id,
///     provider::{TypeProvider, TypeUniverse},
/// };
///
/// let mut universe = TypeUniverse::new();
/// universe
///     .register(
///         TypeDescriptor::new(Id::new("a.Customer"), Id::new("sales.Customer"), TypeSort::Entity)
///             .with_property(Property::new("account", Id::new("a.Account"))),
///     )
///     .unwrap();
/// universe
///     .register(TypeDescriptor::new(Id::new("a.Account"), Id::new("sales.Account"), TypeSort::Entity))
///     .unwrap();
///
/// let graph = ObjectGraphFactory::new(&universe, universe.all_types()).create();
/// assert_eq!(graph.objects().len(), 2);
/// assert_eq!(graph.relations()[0].kind(), RelationKind::OneToOne);
/// ```
pub struct ObjectGraphFactory<'a, P: TypeProvider + ?Sized> {
    provider: &'a P,
    selection: Vec<&'a TypeDescriptor>,
    /// Node ids keyed by logical type, in creation order.
    node_ids: IndexMap<Id, String>,
    /// Nodes keyed by node id, in creation order.
    nodes: IndexMap<String, GraphNode>,
    /// The descriptor that created each node, keyed by logical type.
    descriptors: IndexMap<Id, &'a TypeDescriptor>,
    relations: Vec<GraphRelation>,
}

impl<'a, P: TypeProvider + ?Sized> ObjectGraphFactory<'a, P> {
    /// Create a factory over `selection`, typically the entities of interest.
    pub fn new(provider: &'a P, selection: Vec<&'a TypeDescriptor>) -> Self {
        Self {
            provider,
            selection,
            node_ids: IndexMap::new(),
            nodes: IndexMap::new(),
            descriptors: IndexMap::new(),
            relations: Vec::new(),
        }
    }

    /// Build the graph.
    pub fn create(mut self) -> ObjectGraph {
        info!(types = self.selection.len(); "Building object graph");

        let selection = std::mem::take(&mut self.selection);
        for descriptor in selection {
            self.register(descriptor);
        }
        debug!(
            objects = self.nodes.len(),
            associations = self.relations.len();
            "Objects registered"
        );

        let inheritance = self.inheritance_relations();
        debug!(inheritance = inheritance.len(); "Inheritance relations reduced");
        self.relations.extend(inheritance);

        ObjectGraph::new(self.nodes.into_values().collect(), self.relations)
    }

    /// Return the node id for `descriptor`'s logical type, creating the node on first sight.
    ///
    /// A new node's associations are walked right after it is recorded, so a
    /// type reached again through a cycle resolves to the existing id.
    fn register(&mut self, descriptor: &'a TypeDescriptor) -> String {
        let logical_type = descriptor.logical_type();
        if let Some(id) = self.node_ids.get(&logical_type) {
            return id.clone();
        }

        let id = format!("o{}", self.nodes.len());
        trace!(id = id.as_str(), logical_type:% = logical_type; "Registering object");
        let stereotype = descriptor
            .is_abstract()
            .then(|| ABSTRACT_STEREOTYPE.to_string());
        let node = GraphNode::new(
            id.clone(),
            descriptor.namespace(),
            descriptor.simple_name(),
            stereotype,
        );
        self.node_ids.insert(logical_type, id.clone());
        self.nodes.insert(id.clone(), node);
        self.descriptors.insert(logical_type, descriptor);

        let fields = self.walk_associations(descriptor, &id);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.set_fields(fields);
        }
        id
    }

    fn walk_associations(&mut self, descriptor: &'a TypeDescriptor, id: &str) -> Vec<GraphField> {
        let provider = self.provider;
        let mut fields = Vec::new();
        for association in descriptor.associations(MixedIn::Excluded) {
            let element = provider.type_by_class(association.element_type());
            let element_name = element
                .map(TypeDescriptor::simple_name)
                .unwrap_or_else(|| association.element_type().simple_name());
            fields.push(GraphField::new(
                association.id(),
                element_name,
                association.is_plural(),
            ));

            let Some(element) = element else {
                continue;
            };
            if !(element.is_entity() || element.is_abstract()) {
                continue;
            }

            let target_id = self.register(element);
            if self.draws_association(descriptor, element) {
                self.relations.push(GraphRelation::association(
                    association.is_plural(),
                    id,
                    &target_id,
                    association.id(),
                ));
            } else {
                trace!(
                    from = id,
                    to = target_id.as_str(),
                    association = association.id();
                    "Association not drawn"
                );
            }
        }
        fields
    }

    /// Associations are drawn within a namespace, and never towards a supertype
    /// of the source other than the source itself.
    fn draws_association(&self, source: &TypeDescriptor, target: &TypeDescriptor) -> bool {
        if source.namespace() != target.namespace() {
            return false;
        }
        target.logical_type() == source.logical_type()
            || !self
                .provider
                .is_assignable_from(target.class(), source.class())
    }

    /// Inheritance edges between every pair of registered types, minus those
    /// that have a two-hop witness in the candidate set.
    fn inheritance_relations(&self) -> Vec<GraphRelation> {
        let registered: Vec<(&str, &TypeDescriptor)> = self
            .descriptors
            .iter()
            .filter_map(|(logical_type, descriptor)| {
                let id = self.node_ids.get(logical_type)?;
                Some((id.as_str(), *descriptor))
            })
            .collect();

        let mut candidates: Vec<(&str, &str)> = Vec::new();
        for (sub_id, sub) in &registered {
            for (super_id, sup) in &registered {
                if sub.logical_type() != sup.logical_type()
                    && self.provider.is_assignable_from(sup.class(), sub.class())
                {
                    candidates.push((*sub_id, *super_id));
                }
            }
        }

        let candidate_set: HashSet<(&str, &str)> = candidates.iter().copied().collect();
        candidates
            .iter()
            .filter(|(sub_id, super_id)| {
                let implied = registered.iter().any(|(via, _)| {
                    via != sub_id
                        && via != super_id
                        && candidate_set.contains(&(*sub_id, *via))
                        && candidate_set.contains(&(*via, *super_id))
                });
                !implied
            })
            .map(|(sub_id, super_id)| GraphRelation::inheritance(sub_id, super_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metascope_core::{
        descriptor::{Collection, Property, TypeFlags, TypeSort},
        provider::TypeUniverse,
    };

    fn entity(class: &str, logical: &str) -> TypeDescriptor {
        TypeDescriptor::new(Id::new(class), Id::new(logical), TypeSort::Entity)
    }

    fn abstract_flags() -> TypeFlags {
        TypeFlags {
            abstract_type: true,
            ..TypeFlags::default()
        }
    }

    fn build(universe: &TypeUniverse) -> ObjectGraph {
        ObjectGraphFactory::new(universe, universe.all_types()).create()
    }

    fn edges(graph: &ObjectGraph, kind: RelationKind) -> Vec<(String, String)> {
        graph
            .relations_of_kind(kind)
            .map(|relation| {
                let name = |id: &str| graph.object(id).map(|node| node.name().to_string());
                (
                    name(relation.source()).unwrap_or_default(),
                    name(relation.target()).unwrap_or_default(),
                )
            })
            .collect()
    }

    #[test]
    fn test_customer_account_scenario() {
        let mut universe = TypeUniverse::new();
        universe
            .register(
                entity("com.acme.Customer", "sales.Customer")
                    .with_property(Property::new("name", Id::new("java.lang.String")))
                    .with_property(Property::new("account", Id::new("com.acme.Account"))),
            )
            .expect("unique");
        universe
            .register(entity("com.acme.Account", "sales.Account"))
            .expect("unique");
        universe
            .register_on_demand(TypeDescriptor::new(
                Id::new("java.lang.String"),
                Id::new("java.lang.String"),
                TypeSort::Value,
            ))
            .expect("unique");

        let graph = build(&universe);

        let names: Vec<(&str, &str)> = graph
            .objects()
            .iter()
            .map(|node| (node.id(), node.name()))
            .collect();
        assert_eq!(names, vec![("o0", "Customer"), ("o1", "Account")]);

        assert_eq!(graph.relations().len(), 1);
        let relation = &graph.relations()[0];
        assert_eq!(relation.kind(), RelationKind::OneToOne);
        assert_eq!((relation.source(), relation.target()), ("o0", "o1"));
        assert_eq!(relation.label(), Some("account"));

        let fields: Vec<(&str, &str)> = graph.objects()[0]
            .fields()
            .iter()
            .map(|field| (field.name(), field.element_type()))
            .collect();
        assert_eq!(fields, vec![("name", "String"), ("account", "Account")]);
    }

    #[test]
    fn test_referenced_types_are_registered_depth_first() {
        let mut universe = TypeUniverse::new();
        universe
            .register(
                entity("a.Order", "sales.Order")
                    .with_collection(Collection::new("lines", Id::new("a.OrderLine"))),
            )
            .expect("unique");
        universe
            .register_on_demand(
                entity("a.OrderLine", "sales.OrderLine")
                    .with_property(Property::new("product", Id::new("a.Product"))),
            )
            .expect("unique");
        universe
            .register_on_demand(entity("a.Product", "sales.Product"))
            .expect("unique");

        let graph = build(&universe);

        let ids: Vec<(&str, &str)> = graph
            .objects()
            .iter()
            .map(|node| (node.id(), node.name()))
            .collect();
        assert_eq!(
            ids,
            vec![("o0", "Order"), ("o1", "OrderLine"), ("o2", "Product")]
        );
        let edges: Vec<(&str, &str, RelationKind)> = graph
            .relations()
            .iter()
            .map(|relation| (relation.source(), relation.target(), relation.kind()))
            .collect();
        assert_eq!(
            edges,
            vec![
                ("o1", "o2", RelationKind::OneToOne),
                ("o0", "o1", RelationKind::OneToMany)
            ]
        );
        assert_eq!(graph.relations()[1].note(), Some("0..*"));
    }

    #[test]
    fn test_aliases_and_cycles_collapse_to_one_node() {
        let mut universe = TypeUniverse::new();
        universe
            .register(
                entity("a.Person", "crm.Person")
                    .with_property(Property::new("spouse", Id::new("a.Person")))
                    .with_property(Property::new("friend", Id::new("a.PersonProxy"))),
            )
            .expect("unique");
        universe
            .register(entity("a.PersonProxy", "crm.Person"))
            .expect("unique");

        let graph = build(&universe);

        assert_eq!(graph.objects().len(), 1);
        assert_eq!(
            edges(&graph, RelationKind::OneToOne),
            vec![
                ("Person".to_string(), "Person".to_string()),
                ("Person".to_string(), "Person".to_string())
            ]
        );
    }

    #[test]
    fn test_cross_namespace_association_keeps_field_only() {
        let mut universe = TypeUniverse::new();
        universe
            .register(
                entity("a.Invoice", "billing.Invoice")
                    .with_property(Property::new("customer", Id::new("a.Customer"))),
            )
            .expect("unique");
        universe
            .register(entity("a.Customer", "sales.Customer"))
            .expect("unique");

        let graph = build(&universe);

        assert_eq!(graph.objects().len(), 2);
        assert!(graph.relations().is_empty());
        assert_eq!(graph.objects()[0].fields()[0].name(), "customer");
    }

    #[test]
    fn test_mixed_in_and_non_entity_associations() {
        let mut universe = TypeUniverse::new();
        universe
            .register(
                entity("a.Customer", "sales.Customer")
                    .with_property(Property::new("notes", Id::new("a.Note")).mixed_in())
                    .with_property(Property::new("address", Id::new("a.Address"))),
            )
            .expect("unique");
        universe
            .register_on_demand(entity("a.Note", "sales.Note"))
            .expect("unique");
        universe
            .register_on_demand(TypeDescriptor::new(
                Id::new("a.Address"),
                Id::new("sales.Address"),
                TypeSort::ViewModel,
            ))
            .expect("unique");

        let graph = build(&universe);

        assert_eq!(graph.objects().len(), 1);
        let fields: Vec<&str> = graph.objects()[0]
            .fields()
            .iter()
            .map(GraphField::name)
            .collect();
        assert_eq!(fields, vec!["address"]);
    }

    #[test]
    fn test_abstract_targets_are_registered() {
        let mut universe = TypeUniverse::new();
        universe
            .register(
                entity("a.Order", "sales.Order")
                    .with_property(Property::new("party", Id::new("a.Party"))),
            )
            .expect("unique");
        universe
            .register_on_demand(
                TypeDescriptor::new(Id::new("a.Party"), Id::new("sales.Party"), TypeSort::ViewModel)
                    .with_flags(abstract_flags()),
            )
            .expect("unique");

        let graph = build(&universe);

        let party = graph.object_named("sales", "Party").expect("registered");
        assert_eq!(party.stereotype(), Some(ABSTRACT_STEREOTYPE));
        assert_eq!(edges(&graph, RelationKind::OneToOne).len(), 1);
    }

    #[test]
    fn test_association_to_supertype_is_not_drawn() {
        let mut universe = TypeUniverse::new();
        universe
            .register(
                entity("a.Employee", "hr.Employee")
                    .with_superclass(Id::new("a.Person"))
                    .with_property(Property::new("asPerson", Id::new("a.Person"))),
            )
            .expect("unique");
        universe
            .register(entity("a.Person", "hr.Person"))
            .expect("unique");

        let graph = build(&universe);

        assert!(edges(&graph, RelationKind::OneToOne).is_empty());
        assert_eq!(
            edges(&graph, RelationKind::Inheritance),
            vec![("Employee".to_string(), "Person".to_string())]
        );
    }

    #[test]
    fn test_inheritance_two_hop_reduction() {
        let mut universe = TypeUniverse::new();
        universe
            .register(entity("h.A", "h.A").with_superclass(Id::new("h.B")))
            .expect("unique");
        universe
            .register(entity("h.B", "h.B").with_superclass(Id::new("h.C")))
            .expect("unique");
        universe.register(entity("h.C", "h.C")).expect("unique");

        let graph = build(&universe);

        assert_eq!(
            edges(&graph, RelationKind::Inheritance),
            vec![
                ("A".to_string(), "B".to_string()),
                ("B".to_string(), "C".to_string())
            ]
        );
    }

    #[test]
    fn test_inheritance_without_registered_intermediate_is_kept() {
        let mut universe = TypeUniverse::new();
        universe
            .register(entity("h.A", "h.A").with_superclass(Id::new("h.B")))
            .expect("unique");
        universe
            .register_on_demand(entity("h.B", "h.B").with_superclass(Id::new("h.C")))
            .expect("unique");
        universe.register(entity("h.C", "h.C")).expect("unique");

        let graph = build(&universe);

        assert_eq!(
            edges(&graph, RelationKind::Inheritance),
            vec![("A".to_string(), "C".to_string())]
        );
    }

    #[test]
    fn test_inheritance_reduction_is_two_hop_only() {
        // A->D has the two-hop witness A->B->D in the candidate set.
        let mut universe = TypeUniverse::new();
        universe
            .register(entity("h.A", "h.A").with_superclass(Id::new("h.B")))
            .expect("unique");
        universe
            .register(entity("h.B", "h.B").with_superclass(Id::new("h.C")))
            .expect("unique");
        universe
            .register(entity("h.C", "h.C").with_superclass(Id::new("h.D")))
            .expect("unique");
        universe.register(entity("h.D", "h.D")).expect("unique");

        let graph = build(&universe);

        assert_eq!(
            edges(&graph, RelationKind::Inheritance),
            vec![
                ("A".to_string(), "B".to_string()),
                ("B".to_string(), "C".to_string()),
                ("C".to_string(), "D".to_string())
            ]
        );
    }
}
