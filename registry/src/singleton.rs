//! The singleton registry: at most one lazily constructed instance per key.

use std::borrow::Borrow;
use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

use crate::config::{RegistryBuilder, RegistryConfig};
use crate::construction::{FactoryRegistry, KeyState};
use crate::error::{BoxError, Error, Result};

pub(crate) type SingletonFactory<A, V> =
  dyn Fn(A) -> std::result::Result<Arc<V>, BoxError> + Send + Sync;

/// Keys currently being constructed by the thread holding the construction
/// lock, innermost last.
type InFlight<K> = RefCell<Vec<K>>;

/// Marks a key as under construction for as long as it lives.
///
/// Entering a key that is already in flight means a factory asked, directly or
/// through other factories, for the instance it is building.
struct ConstructionGuard<'a, K> {
  in_flight: &'a InFlight<K>,
}

impl<'a, K: PartialEq + fmt::Debug> ConstructionGuard<'a, K> {
  fn enter(in_flight: &'a InFlight<K>, key: K) -> Result<Self, K> {
    let mut stack = in_flight.borrow_mut();
    if stack.contains(&key) {
      return Err(Error::CircularDependency { key });
    }
    stack.push(key);
    Ok(Self { in_flight })
  }
}

impl<K> Drop for ConstructionGuard<'_, K> {
  fn drop(&mut self) {
    self.in_flight.borrow_mut().pop();
  }
}

/// A thread-safe registry that constructs at most one instance per key.
///
/// Each key is bound to a factory taking construction arguments of type `A`.
/// The first successful [`get_instance`](Self::get_instance) for a key runs
/// the factory with that caller's arguments and caches the result; every
/// later call, from any thread, receives the same `Arc<V>` and its arguments
/// are dropped. A factory error is returned to the caller and nothing is
/// cached, so a later call tries again.
///
/// `V` is usually a trait object, so callers only ever see the capability
/// they asked for.
///
/// Construction is serialized by one lock per registry. Reads of
/// already-built instances never take it.
pub struct SingletonRegistry<K, A, V: ?Sized> {
  factories: FactoryRegistry<K, SingletonFactory<A, V>>,
  instances: DashMap<K, Arc<V>>,
  // Reentrant so a factory can resolve other keys of the same registry.
  construction: ReentrantMutex<InFlight<K>>,
  config: RegistryConfig,
}

impl<K, A, V> SingletonRegistry<K, A, V>
where
  K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
  A: 'static,
  V: ?Sized + Send + Sync + 'static,
{
  /// Creates a new, empty registry with the default configuration.
  pub fn new() -> Self {
    Self::with_config(RegistryConfig::default())
  }

  pub fn with_config(config: RegistryConfig) -> Self {
    Self {
      factories: FactoryRegistry::new(),
      instances: DashMap::new(),
      construction: ReentrantMutex::new(RefCell::new(Vec::new())),
      config,
    }
  }

  pub fn builder() -> RegistryBuilder<K, A, V> {
    RegistryBuilder::new()
  }

  pub fn config(&self) -> &RegistryConfig {
    &self.config
  }

  // --- Registration ---

  /// Binds an infallible factory to `key`, replacing any earlier binding.
  ///
  /// Replacing the factory of a key that has already been constructed does
  /// not touch the cached instance.
  pub fn register(
    &self,
    key: K,
    factory: impl Fn(A) -> Arc<V> + Send + Sync + 'static,
  ) -> Result<(), K> {
    self
      .factories
      .register(key, Arc::new(move |args| Ok::<_, BoxError>(factory(args))))
  }

  /// Binds a fallible factory to `key`, replacing any earlier binding.
  ///
  /// An `Err` from the factory surfaces as [`Error::Construction`] and leaves
  /// the key unconstructed.
  pub fn register_with<E>(
    &self,
    key: K,
    factory: impl Fn(A) -> std::result::Result<Arc<V>, E> + Send + Sync + 'static,
  ) -> Result<(), K>
  where
    E: Into<BoxError>,
  {
    self.factories.register(
      key,
      Arc::new(move |args| factory(args).map_err(Into::<BoxError>::into)),
    )
  }

  /// Binds an already built instance to `key`.
  ///
  /// The instance becomes visible on the first `get_instance` like any other,
  /// and the arguments of that call are ignored.
  pub fn register_instance(&self, key: K, instance: Arc<V>) -> Result<(), K> {
    self
      .factories
      .register(key, Arc::new(move |_: A| Ok::<_, BoxError>(Arc::clone(&instance))))
  }

  /// Stops accepting registrations. See [`FactoryRegistry::freeze`].
  pub fn freeze(&self) {
    self.factories.freeze();
  }

  pub fn is_frozen(&self) -> bool {
    self.factories.is_frozen()
  }

  // --- Resolution ---

  /// Returns the instance for `key`, constructing it with `args` on first use.
  pub fn get_instance<Q>(&self, key: &Q, args: A) -> Result<Arc<V>, K>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
  {
    if let Some(instance) = self.instances.get(key) {
      tracing::trace!(key = ?instance.key(), "instance cache hit");
      return Ok(Arc::clone(instance.value()));
    }
    self.construct(key, args)
  }

  fn construct<Q>(&self, key: &Q, args: A) -> Result<Arc<V>, K>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
  {
    let lock = self.lock_construction(key)?;

    // Another caller may have finished constructing while this one waited.
    if let Some(instance) = self.instances.get(key) {
      tracing::trace!(key = ?instance.key(), "instance constructed while waiting");
      return Ok(Arc::clone(instance.value()));
    }

    let factory = self.factories.resolve(key)?;
    let key = key.to_owned();
    let _guard = ConstructionGuard::enter(&lock, key.clone())?;

    tracing::debug!(key = ?key, "constructing instance");
    let instance = match factory(args) {
      Ok(instance) => instance,
      Err(source) => return Err(Error::Construction { key, source }),
    };
    self.instances.insert(key.clone(), Arc::clone(&instance));
    tracing::debug!(key = ?key, "instance constructed");

    Ok(instance)
  }

  fn lock_construction<Q>(&self, key: &Q) -> Result<ReentrantMutexGuard<'_, InFlight<K>>, K>
  where
    Q: ToOwned<Owned = K> + ?Sized,
  {
    match self.config.lock_timeout {
      None => Ok(self.construction.lock()),
      Some(timeout) => {
        self
          .construction
          .try_lock_for(timeout)
          .ok_or_else(|| Error::ConstructionTimeout {
            key: key.to_owned(),
            waited: timeout,
          })
      }
    }
  }

  // --- Inspection ---

  /// Returns the instance for `key` if it has already been constructed.
  pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self
      .instances
      .get(key)
      .map(|instance| Arc::clone(instance.value()))
  }

  pub fn is_constructed<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.instances.contains_key(key)
  }

  pub fn is_registered<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.factories.contains(key)
  }

  pub fn state<Q>(&self, key: &Q) -> KeyState
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    if self.is_constructed(key) {
      KeyState::Constructed
    } else if self.is_registered(key) {
      KeyState::Registered
    } else {
      KeyState::Unregistered
    }
  }

  /// Number of keys with a factory bound.
  pub fn len(&self) -> usize {
    self.factories.len()
  }

  pub fn is_empty(&self) -> bool {
    self.factories.is_empty()
  }

  /// Number of keys whose instance has been constructed.
  pub fn constructed_count(&self) -> usize {
    self.instances.len()
  }

  /// A snapshot of the registered keys, in no particular order.
  pub fn keys(&self) -> Vec<K> {
    self.factories.keys()
  }
}

impl<K, A, V> Default for SingletonRegistry<K, A, V>
where
  K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
  A: 'static,
  V: ?Sized + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<K, A, V> fmt::Debug for SingletonRegistry<K, A, V>
where
  K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
  A: 'static,
  V: ?Sized + Send + Sync + 'static,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SingletonRegistry")
      .field("registered", &self.len())
      .field("constructed", &self.constructed_count())
      .field("config", &self.config)
      .finish_non_exhaustive()
  }
}
