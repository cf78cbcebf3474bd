//! Node and relation types of the simplified object graph.

use std::fmt;

use serde::Serialize;

/// Kind of a [`GraphRelation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationKind {
    OneToOne,
    OneToMany,
    Inheritance,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OneToOne => "ONE_TO_ONE",
            Self::OneToMany => "ONE_TO_MANY",
            Self::Inheritance => "INHERITANCE",
        };
        f.write_str(name)
    }
}

/// One association-bearing member of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphField {
    name: String,
    /// Simple name of the referenced type.
    element_type: String,
    plural: bool,
}

impl GraphField {
    pub fn new(name: impl Into<String>, element_type: impl Into<String>, plural: bool) -> Self {
        Self {
            name: name.into(),
            element_type: element_type.into(),
            plural,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    pub fn is_plural(&self) -> bool {
        self.plural
    }
}

/// One logical type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    /// Short id in creation order: `o0`, `o1`, ...
    id: String,
    namespace: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stereotype: Option<String>,
    fields: Vec<GraphField>,
}

impl GraphNode {
    pub(crate) fn new(
        id: String,
        namespace: String,
        name: String,
        stereotype: Option<String>,
    ) -> Self {
        Self {
            id,
            namespace,
            name,
            stereotype,
            fields: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `abstract` for abstract types.
    pub fn stereotype(&self) -> Option<&str> {
        self.stereotype.as_deref()
    }

    pub fn fields(&self) -> &[GraphField] {
        &self.fields
    }

    pub(crate) fn set_fields(&mut self, fields: Vec<GraphField>) {
        self.fields = fields;
    }
}

/// A directed edge between two nodes, referenced by node id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphRelation {
    kind: RelationKind,
    from: String,
    to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

impl GraphRelation {
    /// An association labeled with the member id.
    ///
    /// One-to-many associations carry the note `0..*`.
    pub(crate) fn association(plural: bool, from: &str, to: &str, label: &str) -> Self {
        let (kind, note) = if plural {
            (RelationKind::OneToMany, Some("0..*".to_string()))
        } else {
            (RelationKind::OneToOne, None)
        };
        Self {
            kind,
            from: from.to_string(),
            to: to.to_string(),
            label: Some(label.to_string()),
            note,
        }
    }

    /// Subtype `from` inherits from supertype `to`.
    pub(crate) fn inheritance(from: &str, to: &str) -> Self {
        Self {
            kind: RelationKind::Inheritance,
            from: from.to_string(),
            to: to.to_string(),
            label: None,
            note: None,
        }
    }

    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    /// Id of the source node.
    pub fn source(&self) -> &str {
        &self.from
    }

    /// Id of the target node.
    pub fn target(&self) -> &str {
        &self.to
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

/// Nodes in creation order plus association and inheritance relations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObjectGraph {
    objects: Vec<GraphNode>,
    relations: Vec<GraphRelation>,
}

impl ObjectGraph {
    pub(crate) fn new(objects: Vec<GraphNode>, relations: Vec<GraphRelation>) -> Self {
        Self { objects, relations }
    }

    pub fn objects(&self) -> &[GraphNode] {
        &self.objects
    }

    pub fn relations(&self) -> &[GraphRelation] {
        &self.relations
    }

    pub fn object(&self, id: &str) -> Option<&GraphNode> {
        self.objects.iter().find(|node| node.id == id)
    }

    /// Find a node by namespace and simple name.
    pub fn object_named(&self, namespace: &str, name: &str) -> Option<&GraphNode> {
        self.objects
            .iter()
            .find(|node| node.namespace == namespace && node.name == name)
    }

    pub fn relations_of_kind(&self, kind: RelationKind) -> impl Iterator<Item = &GraphRelation> {
        self.relations
            .iter()
            .filter(move |relation| relation.kind == kind)
    }
}
