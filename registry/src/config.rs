//! Registry configuration and the builder that applies it.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::time::Duration;

use crate::singleton::SingletonRegistry;

/// Tunables for a [`SingletonRegistry`].
///
/// With the `serde` feature enabled the config can be loaded from application
/// configuration. Durations are written in human-readable form:
///
/// ```json
/// { "lock_timeout": "250ms" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct RegistryConfig {
  /// How long a caller waits for the construction lock before giving up with
  /// [`Error::ConstructionTimeout`](crate::Error::ConstructionTimeout).
  /// `None` waits indefinitely.
  #[cfg_attr(
    feature = "serde",
    serde(with = "humantime_opt", skip_serializing_if = "Option::is_none")
  )]
  pub lock_timeout: Option<Duration>,
}

#[cfg(feature = "serde")]
mod humantime_opt {
  use serde::{de, Deserialize, Deserializer, Serializer};
  use std::time::Duration;

  pub(super) fn serialize<S: Serializer>(
    value: &Option<Duration>,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    match value {
      Some(duration) => {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
      }
      None => serializer.serialize_none(),
    }
  }

  pub(super) fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Option<Duration>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
      Some(text) => humantime::parse_duration(&text)
        .map(Some)
        .map_err(de::Error::custom),
      None => Ok(None),
    }
  }
}

/// A builder for [`SingletonRegistry`] instances.
pub struct RegistryBuilder<K, A, V: ?Sized> {
  config: RegistryConfig,
  _marker: PhantomData<fn(K, A) -> Box<V>>,
}

impl<K, A, V: ?Sized> fmt::Debug for RegistryBuilder<K, A, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RegistryBuilder")
      .field("config", &self.config)
      .finish()
  }
}

impl<K, A, V: ?Sized> Default for RegistryBuilder<K, A, V> {
  fn default() -> Self {
    Self {
      config: RegistryConfig::default(),
      _marker: PhantomData,
    }
  }
}

impl<K, A, V: ?Sized> RegistryBuilder<K, A, V> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Replaces the whole configuration, e.g. with one loaded from a file.
  pub fn config(mut self, config: RegistryConfig) -> Self {
    self.config = config;
    self
  }

  /// Bounds how long a caller waits for the construction lock.
  pub fn lock_timeout(mut self, timeout: Duration) -> Self {
    self.config.lock_timeout = Some(timeout);
    self
  }

  /// Waits for the construction lock indefinitely. This is the default.
  pub fn no_lock_timeout(mut self) -> Self {
    self.config.lock_timeout = None;
    self
  }
}

impl<K, A, V> RegistryBuilder<K, A, V>
where
  K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
  A: 'static,
  V: ?Sized + Send + Sync + 'static,
{
  pub fn build(self) -> SingletonRegistry<K, A, V> {
    SingletonRegistry::with_config(self.config)
  }
}
