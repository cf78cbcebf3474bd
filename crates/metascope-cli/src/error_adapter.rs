//! Error adapter for converting MetascopeError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.
//!
//! # Multi-Error Support
//!
//! When a [`MetascopeError::DuplicateLogicalTypes`] names several colliding
//! logical types, each collision is rendered independently.

use std::{error::Error, fmt};

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use metascope::{DuplicateMapping, MetascopeError};

/// Adapter for a single duplicate logical type mapping.
#[derive(Debug)]
pub struct DuplicateAdapter<'a> {
    mapping: &'a DuplicateMapping,
}

impl<'a> DuplicateAdapter<'a> {
    /// Create a new duplicate adapter.
    pub fn new(mapping: &'a DuplicateMapping) -> Self {
        Self { mapping }
    }
}

impl fmt::Display for DuplicateAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duplicate logical type: {}", self.mapping)
    }
}

impl Error for DuplicateAdapter<'_> {}

impl MietteDiagnostic for DuplicateAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("metascope::duplicate"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!(
            "publish `{}` or `{}` under a different logical type name",
            self.mapping.first(),
            self.mapping.second()
        )))
    }
}

/// Adapter for the remaining [`MetascopeError`] variants.
pub struct ErrorAdapter<'a>(pub &'a MetascopeError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            MetascopeError::Io(_) => "metascope::io",
            MetascopeError::DuplicateLogicalTypes(_) => "metascope::duplicate",
            MetascopeError::Universe(_) => "metascope::universe",
            MetascopeError::Config(_) => "metascope::config",
            MetascopeError::Serialization(_) => "metascope::serialization",
        };
        Some(Box::new(code))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// One colliding logical type.
    Duplicate(DuplicateAdapter<'a>),
    /// Any other error.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Duplicate(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Reportable::Duplicate(_) => None,
            Reportable::Error(e) => Error::source(e),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Duplicate(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Duplicate(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }
}

/// Convert a [`MetascopeError`] into a list of reportable errors.
///
/// For [`MetascopeError::DuplicateLogicalTypes`], this returns one
/// [`Reportable`] for each colliding logical type. For other error variants,
/// this returns a single [`Reportable`].
pub fn to_reportables(err: &MetascopeError) -> Vec<Reportable<'_>> {
    match err {
        MetascopeError::DuplicateLogicalTypes(duplicates) => duplicates
            .mappings()
            .iter()
            .map(|mapping| Reportable::Duplicate(DuplicateAdapter::new(mapping)))
            .collect(),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}
