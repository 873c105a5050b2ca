//! The product factory: a registry of constructors that builds a fresh
//! instance on every call.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::construction::{FactoryRegistry, KeyState};
use crate::error::{BoxError, Error, Result};

pub(crate) type ProductConstructor<A, P> =
  dyn Fn(A) -> std::result::Result<Box<P>, BoxError> + Send + Sync;

/// A concrete product that can be built from construction arguments `A`.
///
/// Implement this for each product type to register it by tag with
/// [`register_products!`](crate::register_products).
pub trait Construct<A>: Sized {
  fn construct(args: A) -> Self;
}

/// A thread-safe registry that maps tags to product constructors.
///
/// Unlike [`SingletonRegistry`](crate::SingletonRegistry) nothing is cached:
/// every [`create`](Self::create) runs the constructor and returns an
/// independent instance. Constructors must return `Box<P>`, so a type that
/// does not implement the product interface `P` cannot be registered.
pub struct ProductFactory<K, A, P: ?Sized> {
  constructors: FactoryRegistry<K, ProductConstructor<A, P>>,
}

impl<K, A, P> ProductFactory<K, A, P>
where
  K: Eq + Hash + Clone + fmt::Debug + 'static,
  A: 'static,
  P: ?Sized + 'static,
{
  pub fn new() -> Self {
    Self {
      constructors: FactoryRegistry::new(),
    }
  }

  /// Binds an infallible constructor to `tag`, replacing any earlier binding.
  pub fn register(
    &self,
    tag: impl Into<K>,
    constructor: impl Fn(A) -> Box<P> + Send + Sync + 'static,
  ) -> Result<(), K> {
    self.constructors.register(
      tag.into(),
      Arc::new(move |args| Ok::<_, BoxError>(constructor(args))),
    )
  }

  /// Binds a fallible constructor to `tag`, replacing any earlier binding.
  pub fn register_with<E>(
    &self,
    tag: impl Into<K>,
    constructor: impl Fn(A) -> std::result::Result<Box<P>, E> + Send + Sync + 'static,
  ) -> Result<(), K>
  where
    E: Into<BoxError>,
  {
    self.constructors.register(
      tag.into(),
      Arc::new(move |args| constructor(args).map_err(Into::<BoxError>::into)),
    )
  }

  /// Builds a new product for `tag`.
  pub fn create<Q>(&self, tag: &Q, args: A) -> Result<Box<P>, K>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
  {
    let constructor = self.constructors.resolve(tag)?;
    constructor(args).map_err(|source| Error::Construction {
      key: tag.to_owned(),
      source,
    })
  }

  pub fn contains<Q>(&self, tag: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.constructors.contains(tag)
  }

  pub fn state<Q>(&self, tag: &Q) -> KeyState
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    if self.contains(tag) {
      KeyState::Registered
    } else {
      KeyState::Unregistered
    }
  }

  pub fn len(&self) -> usize {
    self.constructors.len()
  }

  pub fn is_empty(&self) -> bool {
    self.constructors.is_empty()
  }

  /// A snapshot of the registered tags, in no particular order.
  pub fn tags(&self) -> Vec<K> {
    self.constructors.keys()
  }

  /// Stops accepting registrations. See [`FactoryRegistry::freeze`].
  pub fn freeze(&self) {
    self.constructors.freeze();
  }

  pub fn is_frozen(&self) -> bool {
    self.constructors.is_frozen()
  }
}

impl<K, A, P> Default for ProductFactory<K, A, P>
where
  K: Eq + Hash + Clone + fmt::Debug + 'static,
  A: 'static,
  P: ?Sized + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<K, A, P> fmt::Debug for ProductFactory<K, A, P>
where
  K: Eq + Hash + Clone + fmt::Debug + 'static,
  A: 'static,
  P: ?Sized + 'static,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ProductFactory")
      .field("constructors", &self.constructors)
      .finish()
  }
}
