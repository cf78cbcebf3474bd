//! Facets: units of behavioral metadata attached to types and members.
//!
//! A facet is identified by its declared facet type (what it means, e.g.
//! `HiddenFacet`) and its implementation (where it came from, e.g.
//! `HiddenFacetFromLayout`). Its payload is an ordered set of named
//! [`AttributeValue`]s. When several facets of the same type competed for a
//! member, the winner carries the full ranking so that the losing candidates
//! can still be reported.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::identifier::Id;

/// Ranking tier of a facet. Higher tiers win over lower ones.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precedence {
    /// Installed only so that the member has some value; anything else wins.
    Fallback,
    /// Derived by convention, e.g. from a naming pattern.
    Inferred,
    #[default]
    Default,
    /// Explicitly configured, e.g. via layout files.
    High,
}

impl Precedence {
    /// Symbolic name of the tier, as rendered in exports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fallback => "FALLBACK",
            Self::Inferred => "INFERRED",
            Self::Default => "DEFAULT",
            Self::High => "HIGH",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reference to a method, as captured by facets that delegate to user code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRef {
    declaring_type: Id,
    name: String,
    #[serde(default)]
    parameter_types: Vec<Id>,
    #[serde(default)]
    return_type: Option<Id>,
}

impl MethodRef {
    /// Create a reference to a method without parameters and without a return value.
    pub fn new(declaring_type: Id, name: impl Into<String>) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            parameter_types: Vec::new(),
            return_type: None,
        }
    }

    pub fn with_parameter(mut self, parameter_type: Id) -> Self {
        self.parameter_types.push(parameter_type);
        self
    }

    pub fn with_return_type(mut self, return_type: Id) -> Self {
        self.return_type = Some(return_type);
        self
    }

    /// Fully qualified signature, e.g. `java.lang.String com.acme.Customer.title()`.
    ///
    /// Methods without a return type render as `void`.
    pub fn signature(&self) -> String {
        let return_type = self
            .return_type
            .map(|ty| ty.to_string())
            .unwrap_or_else(|| "void".to_string());
        let parameters = self
            .parameter_types
            .iter()
            .map(|ty| ty.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{return_type} {}.{}({parameters})",
            self.declaring_type, self.name
        )
    }
}

/// Closed set of shapes a facet attribute may take.
///
/// Every shape has its own canonical string form; rendering lives with the
/// exporter, this type only carries the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    /// Explicitly unset.
    Null,
    Text(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Method(MethodRef),
    /// Symbolic name of an enum constant.
    Enum(String),
    /// Reference to a class by its fully qualified name.
    Type(Id),
    /// Source text of a regular expression.
    Pattern(String),
    /// A nested facet, identified by its implementation.
    Facet(Id),
    /// A processing component (validator, parser, ...), identified by its implementation.
    Processor(Id),
    /// A type descriptor, identified by its own class name.
    Specification(Id),
    /// A domain member, identified by its member id.
    Member(String),
    List(Vec<AttributeValue>),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// A single facet attached to a type, member or parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facet {
    facet_type: Id,
    implementation: Id,
    #[serde(default)]
    precedence: Precedence,
    #[serde(default)]
    attributes: IndexMap<String, AttributeValue>,
    /// Every candidate of the same facet type that competed for the holder,
    /// including the winner itself.
    #[serde(default)]
    shared_ranking: Vec<Facet>,
}

impl Facet {
    /// Create a facet with [`Precedence::Default`] and no attributes.
    pub fn new(facet_type: Id, implementation: Id) -> Self {
        Self {
            facet_type,
            implementation,
            precedence: Precedence::Default,
            attributes: IndexMap::new(),
            shared_ranking: Vec::new(),
        }
    }

    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_ranking(mut self, candidates: Vec<Facet>) -> Self {
        self.shared_ranking = candidates;
        self
    }

    pub fn facet_type(&self) -> Id {
        self.facet_type
    }

    pub fn implementation(&self) -> Id {
        self.implementation
    }

    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    /// Visit every attribute in declaration order.
    pub fn visit_attributes(&self, mut visitor: impl FnMut(&str, &AttributeValue)) {
        for (name, value) in &self.attributes {
            visitor(name, value);
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Competing candidates ordered best first.
    ///
    /// Candidates are ordered by descending precedence; ties keep the order in
    /// which they were recorded. The first entry is the winning facet.
    pub fn ranked_candidates(&self) -> Vec<&Facet> {
        let mut ranked: Vec<&Facet> = self.shared_ranking.iter().collect();
        ranked.sort_by(|a, b| b.precedence.cmp(&a.precedence));
        ranked
    }
}

/// Anything that carries facets.
pub trait FacetHolder {
    fn facets(&self) -> &[Facet];

    /// Returns the facet of the given declared type, if present.
    fn facet(&self, facet_type: Id) -> Option<&Facet> {
        self.facets()
            .iter()
            .find(|facet| facet.facet_type() == facet_type)
    }

    fn contains_facet(&self, facet_type: Id) -> bool {
        self.facet(facet_type).is_some()
    }
}
