//! Canonical string rendering of facet attributes.
//!
//! Rendering never fails. Values without meaningful content (null, empty
//! strings, empty lists) render to `None` and are left out of the export.

use metascope_core::facet::{AttributeValue, Facet};

use crate::export::document::FacetAttrExport;

/// Name of the synthetic attribute carrying a facet's [`Precedence`](metascope_core::facet::Precedence).
pub const PRECEDENCE_ATTRIBUTE: &str = "precedence";

/// Separator between the rendered elements of a list attribute.
pub const LIST_SEPARATOR: &str = ";";

/// Render a single attribute value, or `None` if it should be omitted.
///
/// # Examples
///
/// ```
/// use metascope::export::render_attribute;
/// use metascope_core::{facet::AttributeValue, identifier::Id};
///
/// let value = AttributeValue::List(vec![
///     AttributeValue::Type(Id::new("java.lang.String")),
///     AttributeValue::Null,
///     AttributeValue::Enum("EVERYWHERE".into()),
/// ]);
/// assert_eq!(render_attribute(&value).as_deref(), Some("java.lang.String;EVERYWHERE"));
/// assert_eq!(render_attribute(&AttributeValue::Text(String::new())), None);
/// ```
pub fn render_attribute(value: &AttributeValue) -> Option<String> {
    match value {
        AttributeValue::Null => None,
        AttributeValue::Text(text) if text.is_empty() => None,
        AttributeValue::Text(text) => Some(text.clone()),
        AttributeValue::Bool(flag) => Some(flag.to_string()),
        AttributeValue::Int(number) => Some(number.to_string()),
        AttributeValue::Float(number) => Some(number.to_string()),
        AttributeValue::Method(method) => Some(method.signature()),
        AttributeValue::Enum(symbol) => Some(symbol.clone()),
        AttributeValue::Type(class) => Some(class.to_string()),
        AttributeValue::Pattern(pattern) => Some(pattern.clone()),
        AttributeValue::Facet(implementation) | AttributeValue::Processor(implementation) => {
            Some(implementation.to_string())
        }
        AttributeValue::Specification(class) => Some(class.to_string()),
        AttributeValue::Member(member_id) => Some(member_id.clone()),
        AttributeValue::List(elements) => {
            let rendered: Vec<String> = elements.iter().filter_map(render_attribute).collect();
            if rendered.is_empty() {
                None
            } else {
                Some(rendered.join(LIST_SEPARATOR))
            }
        }
    }
}

/// Render every attribute of `facet`, preceded by its precedence.
///
/// The result is in declaration order; [`FacetExport::new`](crate::export::FacetExport::new)
/// takes care of sorting.
pub fn render_facet_attributes(facet: &Facet) -> Vec<FacetAttrExport> {
    let mut attributes = vec![FacetAttrExport::new(
        PRECEDENCE_ATTRIBUTE,
        facet.precedence().name(),
    )];
    facet.visit_attributes(|name, value| {
        if name == PRECEDENCE_ATTRIBUTE {
            return;
        }
        if let Some(rendered) = render_attribute(value) {
            attributes.push(FacetAttrExport::new(name, rendered));
        }
    });
    attributes
}
