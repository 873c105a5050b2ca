//! Ready-made key types.
//!
//! Any `Eq + Hash + Clone + Debug` type can key a registry. The two types here
//! cover the common cases: a case-insensitive string tag selecting a product
//! kind, and a type identity selecting "the one instance of this type".

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A case-insensitive string tag.
///
/// The tag is lowercased on construction, so `Tag::new("Dog")` and
/// `Tag::new("dog")` select the same binding.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String);

impl Tag {
  pub fn new(tag: impl AsRef<str>) -> Self {
    Self(tag.as_ref().to_lowercase())
  }

  /// The normalized (lowercase) form of the tag.
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl From<&str> for Tag {
  fn from(tag: &str) -> Self {
    Tag::new(tag)
  }
}

impl From<String> for Tag {
  fn from(tag: String) -> Self {
    Tag::new(tag)
  }
}

impl fmt::Debug for Tag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(&self.0, f)
  }
}

impl fmt::Display for Tag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// A key identifying a type, optionally qualified by a name.
///
/// `TypeKey::of::<Database>()` and `TypeKey::named::<Database>("replica")` are
/// distinct keys, so one registry can hold several instances of a type.
#[derive(Clone)]
pub struct TypeKey {
  type_id: TypeId,
  type_name: &'static str,
  name: Option<String>,
}

impl TypeKey {
  pub fn of<T: ?Sized + Any>() -> Self {
    Self {
      type_id: TypeId::of::<T>(),
      type_name: type_name::<T>(),
      name: None,
    }
  }

  pub fn named<T: ?Sized + Any>(name: &str) -> Self {
    Self {
      type_id: TypeId::of::<T>(),
      type_name: type_name::<T>(),
      name: Some(name.to_owned()),
    }
  }

  pub fn type_id(&self) -> TypeId {
    self.type_id
  }

  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }
}

// `type_name` is informational only; identity is the `TypeId` plus the name.
impl PartialEq for TypeKey {
  fn eq(&self, other: &Self) -> bool {
    self.type_id == other.type_id && self.name == other.name
  }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.type_id.hash(state);
    self.name.hash(state);
  }
}

impl fmt::Debug for TypeKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.name {
      Some(name) => write!(f, "Key({}, Name({}))", self.type_name, name),
      None => write!(f, "Key({})", self.type_name),
    }
  }
}
