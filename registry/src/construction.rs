//! The construction registry: a concurrent map from keys to factories.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::error::{Error, RegistrationReason, Result};

/// Where a key sits in its lifecycle.
///
/// `Unregistered -> Registered -> Constructed`. `Constructed` is terminal and
/// only reachable through a singleton registry; a product factory never
/// leaves `Registered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
  Unregistered,
  Registered,
  Constructed,
}

/// A thread-safe map from keys to factories.
///
/// Registration may happen at any time, including while other threads are
/// resolving. A later registration for the same key replaces the earlier one.
/// After [`freeze`](Self::freeze) every registration is rejected.
pub struct FactoryRegistry<K, F: ?Sized> {
  factories: DashMap<K, Arc<F>>,
  // Held shared by `register`, exclusively by `freeze`, so no registration
  // can land after `freeze` returns.
  frozen: RwLock<bool>,
}

impl<K, F> FactoryRegistry<K, F>
where
  K: Eq + Hash + Clone + fmt::Debug,
  F: ?Sized,
{
  /// Creates a new, empty registry.
  pub fn new() -> Self {
    Self {
      factories: DashMap::new(),
      frozen: RwLock::new(false),
    }
  }

  /// Binds `factory` to `key`, replacing any earlier binding.
  pub fn register(&self, key: K, factory: Arc<F>) -> Result<(), K> {
    let frozen = self.frozen.read();
    if *frozen {
      return Err(Error::Registration {
        key,
        reason: RegistrationReason::Frozen,
      });
    }
    let replaced = self.factories.insert(key.clone(), factory).is_some();
    tracing::debug!(key = ?key, replaced, "registered factory");
    Ok(())
  }

  /// Returns the factory bound to `key`.
  ///
  /// The factory is cloned out of the map, so no map lock is held while the
  /// caller runs it.
  pub fn resolve<Q>(&self, key: &Q) -> Result<Arc<F>, K>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
  {
    match self.factories.get(key) {
      Some(factory) => Ok(Arc::clone(factory.value())),
      None => Err(Error::NotRegistered {
        key: key.to_owned(),
      }),
    }
  }

  pub fn contains<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.factories.contains_key(key)
  }

  pub fn len(&self) -> usize {
    self.factories.len()
  }

  pub fn is_empty(&self) -> bool {
    self.factories.is_empty()
  }

  /// A snapshot of the registered keys, in no particular order.
  pub fn keys(&self) -> Vec<K> {
    self.factories.iter().map(|entry| entry.key().clone()).collect()
  }

  /// Stops accepting registrations. Existing bindings stay resolvable.
  ///
  /// Waits for registrations already in progress to finish. Freezing twice is
  /// a no-op.
  pub fn freeze(&self) {
    let mut frozen = self.frozen.write();
    if !*frozen {
      *frozen = true;
      tracing::debug!(factories = self.factories.len(), "registry frozen");
    }
  }

  pub fn is_frozen(&self) -> bool {
    *self.frozen.read()
  }
}

impl<K, F> Default for FactoryRegistry<K, F>
where
  K: Eq + Hash + Clone + fmt::Debug,
  F: ?Sized,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<K, F> fmt::Debug for FactoryRegistry<K, F>
where
  K: Eq + Hash + Clone + fmt::Debug,
  F: ?Sized,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FactoryRegistry")
      .field("keys", &self.keys())
      .field("frozen", &self.is_frozen())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  type Factory = dyn Fn(u32) -> u32 + Send + Sync;

  fn doubler() -> Arc<Factory> {
    Arc::new(|x: u32| x * 2)
  }

  #[test]
  fn resolve_returns_registered_factory() {
    let registry: FactoryRegistry<String, Factory> = FactoryRegistry::new();
    registry.register("double".to_string(), doubler()).unwrap();

    let factory = registry.resolve("double").unwrap();
    assert_eq!(factory(21), 42);
    assert!(registry.contains("double"));
    assert_eq!(registry.len(), 1);
  }

  #[test]
  fn resolve_unknown_key_is_an_error() {
    let registry: FactoryRegistry<String, Factory> = FactoryRegistry::new();
    match registry.resolve("missing") {
      Err(Error::NotRegistered { key }) => assert_eq!(key, "missing"),
      Err(other) => panic!("unexpected error: {other}"),
      Ok(_) => panic!("expected NotRegistered"),
    }
    assert!(registry.is_empty());
  }

  #[test]
  fn last_registration_wins() {
    let registry: FactoryRegistry<u32, Factory> = FactoryRegistry::new();
    registry.register(1, doubler()).unwrap();
    registry.register(1, Arc::new(|x: u32| x + 1)).unwrap();

    assert_eq!(registry.resolve(&1).unwrap()(10), 11);
    assert_eq!(registry.len(), 1);
  }

  #[test]
  fn frozen_registry_rejects_registration() {
    let registry: FactoryRegistry<u32, Factory> = FactoryRegistry::new();
    registry.register(1, doubler()).unwrap();
    registry.freeze();
    registry.freeze();

    let err = registry.register(2, doubler()).unwrap_err();
    assert!(matches!(
      err,
      Error::Registration {
        key: 2,
        reason: RegistrationReason::Frozen
      }
    ));
    assert!(registry.is_frozen());
    assert!(!registry.contains(&2));
    assert_eq!(registry.resolve(&1).unwrap()(4), 8);
  }
}
