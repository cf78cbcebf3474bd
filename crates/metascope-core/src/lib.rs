//! Metascope Core Types and Definitions
//!
//! This crate provides the read-only model that the metascope exporter and
//! graph factory consume. It includes:
//!
//! - **Identifiers**: Interned qualified names ([`identifier::Id`])
//! - **Descriptors**: Domain types and their members ([`descriptor`] module)
//! - **Facets**: Behavioral metadata and attribute values ([`facet`] module)
//! - **Providers**: The [`provider::TypeProvider`] interface and the in-memory
//!   [`provider::TypeUniverse`]

pub mod descriptor;
pub mod facet;
pub mod identifier;
pub mod provider;
