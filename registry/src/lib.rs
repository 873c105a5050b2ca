//! # Fibre Registry
//!
//! A keyed, thread-safe, lazily-initialized object registry for Rust.
//!
//! Fibre Registry binds keys to factories and hands out instances built by
//! them. Bindings can be added at any point of the application's lifecycle,
//! and every lookup of an unknown key is an explicit error rather than a
//! default value.
//!
//! ## Core Concepts
//!
//! - **SingletonRegistry**: constructs at most one instance per key, on first
//!   use, no matter how many threads ask at once. The arguments of the caller
//!   that wins the race are the ones that take effect; later arguments are
//!   ignored. Failed constructions are not cached.
//! - **ProductFactory**: maps tags to constructors and builds a fresh instance
//!   on every call.
//! - **FactoryRegistry**: the concurrent key-to-factory map both are built on.
//!   It can be frozen once startup registration is done.
//! - **Keys**: any `Eq + Hash + Clone + Debug` type. [`Tag`] is a
//!   case-insensitive string tag, [`TypeKey`] a type identity with an optional
//!   name.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_registry::SingletonRegistry;
//! use std::sync::Arc;
//!
//! trait Connection: Send + Sync {
//!   fn url(&self) -> &str;
//! }
//!
//! struct Database {
//!   url: String,
//! }
//!
//! impl Connection for Database {
//!   fn url(&self) -> &str {
//!     &self.url
//!   }
//! }
//!
//! let registry: SingletonRegistry<String, String, dyn Connection> = SingletonRegistry::new();
//! registry
//!   .register("primary".to_string(), |url: String| Arc::new(Database { url }))
//!   .unwrap();
//!
//! let first = registry.get_instance("primary", "postgres://foo".to_string()).unwrap();
//! let second = registry.get_instance("primary", "postgres://bar".to_string()).unwrap();
//!
//! // The first caller's arguments stick.
//! assert_eq!(second.url(), "postgres://foo");
//! assert!(Arc::ptr_eq(&first, &second));
//! ```

mod config;
mod construction;
mod error;
mod key;
mod macros;
mod product;
mod singleton;

pub use config::{RegistryBuilder, RegistryConfig};
pub use construction::{FactoryRegistry, KeyState};
pub use error::{BoxError, Error, RegistrationReason, Result};
pub use key::{Tag, TypeKey};
pub use product::{Construct, ProductFactory};
pub use singleton::SingletonRegistry;
