use fibre_registry::{
  register_products, Construct, Error, KeyState, ProductFactory, RegistrationReason, Tag,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

// --- Test Fixtures ---

trait Animal: Send + Sync {
  fn name(&self) -> &str;
  fn speak(&self) -> String;
}

struct Dog {
  name: String,
}

struct Cat {
  name: String,
}

impl Construct<String> for Dog {
  fn construct(name: String) -> Self {
    Dog { name }
  }
}

impl Construct<String> for Cat {
  fn construct(name: String) -> Self {
    Cat { name }
  }
}

impl Animal for Dog {
  fn name(&self) -> &str {
    &self.name
  }
  fn speak(&self) -> String {
    format!("{} says woof", self.name)
  }
}

impl Animal for Cat {
  fn name(&self) -> &str {
    &self.name
  }
  fn speak(&self) -> String {
    format!("{} says meow", self.name)
  }
}

type AnimalFactory = ProductFactory<Tag, String, dyn Animal>;

fn animal_factory() -> AnimalFactory {
  let factory = AnimalFactory::new();
  register_products!(factory, "dog" => Dog, "cat" => Cat).unwrap();
  factory
}

fn tag(name: &str) -> Tag {
  Tag::new(name)
}

// --- Factory Tests ---

#[test]
fn test_create_builds_registered_products() {
  let factory = animal_factory();

  let dog = factory.create(&tag("dog"), "John".to_string()).unwrap();
  let cat = factory.create(&tag("cat"), "Mosh".to_string()).unwrap();

  assert_eq!(dog.name(), "John");
  assert_eq!(cat.name(), "Mosh");
  assert_eq!(dog.speak(), "John says woof");
  assert_eq!(cat.speak(), "Mosh says meow");
}

#[test]
fn test_unknown_tag_is_an_error() {
  let factory = animal_factory();

  let err = factory
    .create(&tag("bird"), "Tweety".to_string())
    .err()
    .expect("bird was never registered");

  assert!(matches!(&err, Error::NotRegistered { key } if key.as_str() == "bird"));
  assert_eq!(err.to_string(), "no factory registered for key \"bird\"");
  assert_eq!(factory.state(&tag("bird")), KeyState::Unregistered);
}

#[test]
fn test_every_create_returns_a_fresh_instance() {
  let factory = animal_factory();

  let first = factory.create(&tag("dog"), "Rex".to_string()).unwrap();
  let second = factory.create(&tag("dog"), "Rex".to_string()).unwrap();

  assert_eq!(first.name(), "Rex");
  assert_eq!(second.name(), "Rex");
  let first_ptr = &*first as *const dyn Animal as *const ();
  let second_ptr = &*second as *const dyn Animal as *const ();
  assert_ne!(first_ptr, second_ptr);
  // A pure factory never leaves the registered state.
  assert_eq!(factory.state(&tag("dog")), KeyState::Registered);
}

#[test]
fn test_constructors_are_isolated_per_tag() {
  let dog_calls = Arc::new(AtomicUsize::new(0));
  let cat_calls = Arc::new(AtomicUsize::new(0));
  let factory = AnimalFactory::new();
  factory
    .register("dog", {
      let dog_calls = dog_calls.clone();
      move |name: String| {
        dog_calls.fetch_add(1, Ordering::SeqCst);
        Box::new(Dog::construct(name))
      }
    })
    .unwrap();
  factory
    .register("cat", {
      let cat_calls = cat_calls.clone();
      move |name: String| {
        cat_calls.fetch_add(1, Ordering::SeqCst);
        Box::new(Cat::construct(name))
      }
    })
    .unwrap();

  factory.create(&tag("dog"), "Rex".to_string()).unwrap();
  factory.create(&tag("dog"), "Fido".to_string()).unwrap();
  assert_eq!(dog_calls.load(Ordering::SeqCst), 2);
  assert_eq!(cat_calls.load(Ordering::SeqCst), 0);

  factory.create(&tag("cat"), "Mosh".to_string()).unwrap();
  assert_eq!(dog_calls.load(Ordering::SeqCst), 2);
  assert_eq!(cat_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_tags_are_case_insensitive() {
  let factory = AnimalFactory::new();
  register_products!(factory, "Dog" => Dog).unwrap();

  assert!(factory.contains(&tag("dog")));
  assert!(factory.contains(&tag("DOG")));
  let dog = factory.create(&tag("dOg"), "Rex".to_string()).unwrap();
  assert_eq!(dog.name(), "Rex");
  assert_eq!(factory.tags(), vec![tag("dog")]);
}

#[test]
fn test_last_registration_wins() {
  let factory = AnimalFactory::new();
  register_products!(factory, "pet" => Dog).unwrap();
  register_products!(factory, "pet" => Cat).unwrap();

  let pet = factory.create(&tag("pet"), "Mosh".to_string()).unwrap();
  assert_eq!(pet.speak(), "Mosh says meow");
  assert_eq!(factory.len(), 1);
}

#[test]
fn test_frozen_factory_rejects_registration() {
  let factory = animal_factory();
  factory.freeze();

  let err = register_products!(factory, "bird" => Dog).unwrap_err();

  assert!(matches!(
    &err,
    Error::Registration {
      reason: RegistrationReason::Frozen,
      ..
    }
  ));
  assert_eq!(err.key(), &tag("bird"));
  assert!(factory.is_frozen());
  assert_eq!(factory.len(), 2);
  assert!(factory.create(&tag("dog"), "Rex".to_string()).is_ok());
}

#[test]
fn test_failing_constructor_reports_construction_error() {
  let factory = AnimalFactory::new();
  factory
    .register_with("dog", |name: String| {
      if name.is_empty() {
        Err("a dog needs a name")
      } else {
        Ok(Box::new(Dog::construct(name)) as Box<dyn Animal>)
      }
    })
    .unwrap();

  let err = factory.create(&tag("dog"), String::new()).err().unwrap();
  assert!(matches!(&err, Error::Construction { key, .. } if key.as_str() == "dog"));
  assert_eq!(
    err.to_string(),
    "factory for key \"dog\" failed: a dog needs a name"
  );
  assert!(factory.create(&tag("dog"), "Rex".to_string()).is_ok());
}

#[test]
fn test_concurrent_creates_are_independent() {
  let factory = animal_factory();

  let names: Vec<String> = thread::scope(|s| {
    let handles: Vec<_> = (0..16)
      .map(|i| {
        let factory = &factory;
        s.spawn(move || {
          let kind = if i % 2 == 0 { "dog" } else { "cat" };
          factory
            .create(&tag(kind), format!("pet-{i}"))
            .unwrap()
            .name()
            .to_string()
        })
      })
      .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
  });

  let expected: Vec<String> = (0..16).map(|i| format!("pet-{i}")).collect();
  assert_eq!(names, expected);
}
