//! Subject keys and subject references.
//!
//! Rules are stored per [`SubjectKey`]: either a symbol-like marker
//! (`"dashboard"`, the wildcard `"all"`) or a Rust type. Queries pass a
//! [`Subject`], which is either such a key used directly or a concrete
//! instance whose key is its runtime type.

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Name of the reserved wildcard subject.
pub const ALL: &str = "all";

/// Identity of a Rust type used as a subject.
///
/// Equality and hashing use the [`TypeId`] only; the type name is kept for
/// log output and error messages.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Returns the key for `T`.
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Returns the fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the type name without its module path.
    pub fn short_name(&self) -> &'static str {
        // Generic parameters may contain `::` themselves; only strip the
        // path in front of the outermost type.
        let head = self.name.split('<').next().unwrap_or(self.name);
        match head.rfind("::") {
            Some(idx) => &self.name[idx + 2..],
            None => self.name,
        }
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

/// Key under which a [`SubjectRule`](crate::rule::SubjectRule) is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubjectKey {
    /// Symbol-like marker, e.g. `dashboard` or the wildcard `all`.
    Symbol(Cow<'static, str>),
    /// A Rust type.
    Type(TypeKey),
}

impl SubjectKey {
    /// Creates a symbol key.
    pub fn symbol(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Symbol(name.into())
    }

    /// Creates the key for type `T`.
    pub fn of<T: Any + ?Sized>() -> Self {
        Self::Type(TypeKey::of::<T>())
    }

    /// The wildcard subject consulted when a queried tag has no rule.
    pub const fn all() -> Self {
        Self::Symbol(Cow::Borrowed(ALL))
    }

    /// Returns whether this is the `all` wildcard.
    pub fn is_all(&self) -> bool {
        matches!(self, Self::Symbol(name) if name == ALL)
    }
}

impl fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbol(name) => write!(f, ":{name}"),
            Self::Type(key) => f.write_str(key.short_name()),
        }
    }
}

impl From<&'static str> for SubjectKey {
    fn from(name: &'static str) -> Self {
        Self::Symbol(Cow::Borrowed(name))
    }
}

impl From<String> for SubjectKey {
    fn from(name: String) -> Self {
        Self::Symbol(Cow::Owned(name))
    }
}

impl From<TypeKey> for SubjectKey {
    fn from(key: TypeKey) -> Self {
        Self::Type(key)
    }
}

impl From<&SubjectKey> for SubjectKey {
    fn from(key: &SubjectKey) -> Self {
        key.clone()
    }
}

/// Subject of a query.
///
/// `Tag` queries a key directly (a symbol or a type) and falls back to the
/// `all` wildcard. `Instance` queries a concrete value; its rule is looked
/// up by the value's type and never falls back to `all`.
#[derive(Clone, Copy)]
pub enum Subject<'a> {
    /// A subject key used directly.
    Tag(&'a SubjectKey),
    /// A concrete value together with the key of its type.
    Instance {
        /// Key of the value's runtime type.
        key: TypeKey,
        /// The value itself, available to predicates through downcasting.
        value: &'a dyn Any,
    },
}

impl<'a> Subject<'a> {
    /// Creates a tag subject.
    pub fn tag(key: &'a SubjectKey) -> Self {
        Self::Tag(key)
    }

    /// Creates an instance subject from a value.
    pub fn instance<T: Any>(value: &'a T) -> Self {
        Self::Instance {
            key: TypeKey::of::<T>(),
            value,
        }
    }

    /// Returns the key the subject is resolved by.
    pub fn key(&self) -> SubjectKey {
        match self {
            Self::Tag(key) => (*key).clone(),
            Self::Instance { key, .. } => SubjectKey::Type(*key),
        }
    }

    /// Returns whether the subject is a tag rather than an instance.
    pub fn is_tag(&self) -> bool {
        matches!(self, Self::Tag(_))
    }

    /// Returns whether the subject is the tag for type `T`.
    pub fn is_type<T: Any>(&self) -> bool {
        matches!(self, Self::Tag(SubjectKey::Type(key)) if *key == TypeKey::of::<T>())
    }

    /// Returns the instance as `T`, if the subject is an instance of `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&'a T> {
        match *self {
            Self::Instance { value, .. } => value.downcast_ref::<T>(),
            Self::Tag(_) => None,
        }
    }
}

impl<'a> From<&'a SubjectKey> for Subject<'a> {
    fn from(key: &'a SubjectKey) -> Self {
        Self::Tag(key)
    }
}

impl fmt::Debug for Subject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(key) => f.debug_tuple("Tag").field(key).finish(),
            Self::Instance { key, .. } => f
                .debug_struct("Instance")
                .field("key", key)
                .finish_non_exhaustive(),
        }
    }
}

impl fmt::Display for Subject<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(key) => fmt::Display::fmt(key, f),
            Self::Instance { key, .. } => write!(f, "#<{}>", key.short_name()),
        }
    }
}
