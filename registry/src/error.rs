//! Error types returned by the registry and the product factory.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// The error type a factory may fail with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a registration was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationReason {
  /// The registry was frozen and no longer accepts bindings.
  Frozen,
}

impl fmt::Display for RegistrationReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RegistrationReason::Frozen => write!(f, "registry is frozen"),
    }
  }
}

/// The main error type for `fibre_registry` operations.
///
/// Every variant carries the key the failing operation was asked about.
#[derive(Debug, Error)]
pub enum Error<K: fmt::Debug> {
  /// A lookup or construction asked for a key nothing was bound to.
  #[error("no factory registered for key {key:?}")]
  NotRegistered { key: K },

  /// `register` refused the binding, see [`RegistrationReason`].
  #[error("cannot register key {key:?}: {reason}")]
  Registration { key: K, reason: RegistrationReason },

  /// The factory ran and returned an error. Nothing was cached.
  #[error("factory for key {key:?} failed: {source}")]
  Construction {
    key: K,
    #[source]
    source: BoxError,
  },

  /// The construction lock was not acquired within the configured `lock_timeout`.
  #[error("timed out after {waited:?} waiting to construct key {key:?}")]
  ConstructionTimeout { key: K, waited: Duration },

  /// A factory asked, directly or through other factories, for the key it is building.
  #[error("circular dependency detected while constructing key {key:?}")]
  CircularDependency { key: K },
}

impl<K: fmt::Debug> Error<K> {
  /// The key the failed operation was about.
  pub fn key(&self) -> &K {
    match self {
      Error::NotRegistered { key }
      | Error::Registration { key, .. }
      | Error::Construction { key, .. }
      | Error::ConstructionTimeout { key, .. }
      | Error::CircularDependency { key } => key,
    }
  }

  /// Returns `true` for the error a lookup of an unbound key produces.
  pub fn is_not_registered(&self) -> bool {
    matches!(self, Error::NotRegistered { .. })
  }
}

/// A specialized `Result` type for registry operations on keys of type `K`.
pub type Result<T, K> = std::result::Result<T, Error<K>>;
