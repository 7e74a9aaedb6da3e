//! Element identifiers backed by a global string interner.
//!
//! Element IDs are compared and hashed constantly while reconciling a parsed
//! forest against a document, so they are interned once and passed around as
//! a `Copy` symbol.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner shared by all identifiers.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

/// Prefix used for identifiers synthesized for elements written without an ID.
const ANONYMOUS_PREFIX: &str = "__";

fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    f(&mut interner)
}

/// Stable identifier of a diagram element.
///
/// # Examples
///
/// ```
/// use weft_core::identifier::Id;
///
/// let id = Id::new("server");
/// assert_eq!(id, "server");
///
/// let anon = Id::from_anonymous(3);
/// assert_eq!(anon, "__3");
/// assert!(anon.is_anonymous());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from its textual form.
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Creates the identifier given to the `idx`-th element written without an ID.
    pub fn from_anonymous(idx: usize) -> Self {
        Self::new(&format!("{ANONYMOUS_PREFIX}{idx}"))
    }

    /// Creates a new identifier by appending `-suffix` to this one.
    ///
    /// ```
    /// use weft_core::identifier::Id;
    ///
    /// let edge = Id::new("e1");
    /// assert_eq!(edge.derive("label"), "e1-label");
    /// ```
    pub fn derive(&self, suffix: &str) -> Self {
        let name = format!("{self}-{suffix}");
        Self::new(&name)
    }

    /// Returns `true` when this identifier was synthesized by [`Id::from_anonymous`].
    pub fn is_anonymous(&self) -> bool {
        with_interner(|interner| {
            interner.resolve(self.0).is_some_and(|name| {
                name.strip_prefix(ANONYMOUS_PREFIX)
                    .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
            })
        })
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                .to_string()
        });
        f.write_str(&name)
    }
}

impl std::str::FromStr for Id {
    type Err = std::convert::Infallible;

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
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| interner.resolve(self.0) == Some(other))
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
