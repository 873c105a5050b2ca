use fibre_registry::{Error, SingletonRegistry};
use std::sync::Arc;

struct Service;

fn main() {
  let registry: SingletonRegistry<String, (), Service> = SingletonRegistry::new();

  // --- Resolving a key that was never registered ---
  println!("Attempting to resolve a service that was never registered...");
  match registry.get_instance("unregistered", ()) {
    Ok(_) => panic!("Should not have found the service!"),
    Err(Error::NotRegistered { key }) => println!("Correctly received NotRegistered({key:?})."),
    Err(other) => panic!("Unexpected error: {other}"),
  }

  // --- Register, then retry ---
  // A missing binding is recoverable: register it and ask again.
  registry.register("unregistered".to_string(), |()| Arc::new(Service)).unwrap();
  assert!(registry.get_instance("unregistered", ()).is_ok());
  println!("After registration the same lookup succeeds.");
}
