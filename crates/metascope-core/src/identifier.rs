//! Qualified-name identifiers backed by a global string interner.
//!
//! Class names, logical type names and facet type names are compared and
//! hashed constantly while a metamodel is exported, so they are interned once
//! and passed around as the copyable [`Id`] type.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

/// Separator between the segments of a qualified name.
pub const SEGMENT_SEPARATOR: char = '.';

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock")
}

/// Interned dotted name such as `com.acme.sales.Customer` or `sales.Customer`.
///
/// Two `Id`s compare equal exactly when their strings are equal. Ordering is
/// deliberately not derived: symbol order follows interning order, so callers
/// that need a stable sort compare the [`Display`](fmt::Display) form.
///
/// # Examples
///
/// ```
/// use metascope_core::identifier::Id;
///
/// let class = Id::new("com.acme.sales.Customer");
/// assert_eq!(class.simple_name(), "Customer");
/// assert_eq!(class.namespace(), "com.acme.sales");
/// assert_eq!(class.abbreviated(), "c.a.s.Customer");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from a string slice, interning it on first use.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Returns everything before the last separator, or `""` if there is none.
    pub fn namespace(&self) -> String {
        let name = self.to_string();
        match name.rsplit_once(SEGMENT_SEPARATOR) {
            Some((namespace, _)) => namespace.to_string(),
            None => String::new(),
        }
    }

    /// Returns the last segment of the name.
    pub fn simple_name(&self) -> String {
        let name = self.to_string();
        match name.rsplit_once(SEGMENT_SEPARATOR) {
            Some((_, simple)) => simple.to_string(),
            None => name,
        }
    }

    /// Shortens every namespace segment to its first character.
    ///
    /// Used wherever a class name is shown to humans next to other data,
    /// e.g. titles and shadowed-facet provenance.
    pub fn abbreviated(&self) -> String {
        abbreviate(&self.to_string())
    }
}

/// Shortens every namespace segment of a dotted name to its first character.
///
/// # Examples
///
/// ```
/// use metascope_core::identifier::abbreviate;
///
/// assert_eq!(abbreviate("com.acme.sales.Customer"), "c.a.s.Customer");
/// assert_eq!(abbreviate("Customer"), "Customer");
/// ```
pub fn abbreviate(name: &str) -> String {
    let Some((namespace, simple)) = name.rsplit_once(SEGMENT_SEPARATOR) else {
        return name.to_string();
    };

    let mut abbreviated = String::with_capacity(name.len());
    for segment in namespace.split(SEGMENT_SEPARATOR) {
        if let Some(first) = segment.chars().next() {
            abbreviated.push(first);
            abbreviated.push(SEGMENT_SEPARATOR);
        }
    }
    abbreviated.push_str(simple);
    abbreviated
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Released before writing, so formatting never runs under the lock.
        let str_value = interner()
            .resolve(self.0)
            .expect("Symbol should exist in interner")
            .to_string();
        f.write_str(&str_value)
    }
}

impl std::str::FromStr for Id {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        let interner = interner();
        interner.resolve(self.0) == Some(other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}
