//! Error types for metascope operations.
//!
//! This module provides the main error type [`MetascopeError`]. The only
//! condition raised by the exporter itself is
//! [`MetascopeError::DuplicateLogicalTypes`]; everything else originates from
//! loading inputs or writing outputs.

use std::io;

use thiserror::Error;

use metascope_core::{identifier::Id, provider::UniverseError};

/// The main error type for metascope operations.
#[derive(Debug, Error)]
pub enum MetascopeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    DuplicateLogicalTypes(#[from] DuplicateLogicalTypes),

    #[error("Type universe error: {0}")]
    Universe(#[from] UniverseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Two distinct classes exported under the same logical type name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{logical_type}` is mapped by both `{first}` and `{second}`")]
pub struct DuplicateMapping {
    logical_type: Id,
    first: Id,
    second: Id,
}

impl DuplicateMapping {
    pub fn new(logical_type: Id, first: Id, second: Id) -> Self {
        Self {
            logical_type,
            first,
            second,
        }
    }

    /// The logical type name both classes map to.
    pub fn logical_type(&self) -> Id {
        self.logical_type
    }

    /// The class that claimed the name first.
    pub fn first(&self) -> Id {
        self.first
    }

    /// The class that collided with [`first`](Self::first).
    pub fn second(&self) -> Id {
        self.second
    }
}

/// Every conflicting pair found by an export run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Logical type names must be unique:{}", render_mappings(.mappings))]
pub struct DuplicateLogicalTypes {
    mappings: Vec<DuplicateMapping>,
}

impl DuplicateLogicalTypes {
    pub fn new(mappings: Vec<DuplicateMapping>) -> Self {
        Self { mappings }
    }

    pub fn mappings(&self) -> &[DuplicateMapping] {
        &self.mappings
    }
}

fn render_mappings(mappings: &[DuplicateMapping]) -> String {
    mappings
        .iter()
        .map(|mapping| format!("\n  {mapping}"))
        .collect()
}
