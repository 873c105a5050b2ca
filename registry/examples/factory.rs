use fibre_registry::{register_products, Construct, ProductFactory, Tag};

// 1. Define the abstraction (the trait)
trait Animal: Send + Sync {
  fn name(&self) -> &str;
  fn sound(&self) -> &'static str;
}

// 2. Define concrete products and how to build them
struct Dog {
  name: String,
}

struct Cat {
  name: String,
}

impl Construct<&str> for Dog {
  fn construct(name: &str) -> Self {
    Dog {
      name: name.to_string(),
    }
  }
}

impl Construct<&str> for Cat {
  fn construct(name: &str) -> Self {
    Cat {
      name: name.to_string(),
    }
  }
}

impl Animal for Dog {
  fn name(&self) -> &str {
    &self.name
  }
  fn sound(&self) -> &'static str {
    "woof"
  }
}

impl Animal for Cat {
  fn name(&self) -> &str {
    &self.name
  }
  fn sound(&self) -> &'static str {
    "meow"
  }
}

fn main() {
  // --- Registration ---
  let animals: ProductFactory<Tag, &'static str, dyn Animal> = ProductFactory::new();
  register_products!(animals, "dog" => Dog, "cat" => Cat).unwrap();

  // --- Creation ---
  // Tags are case-insensitive, and every call builds a new animal.
  let dog = animals.create(&Tag::new("Dog"), "John").unwrap();
  let cat = animals.create(&Tag::new("cat"), "Mosh").unwrap();

  println!("{} says {}", dog.name(), dog.sound());
  println!("{} says {}", cat.name(), cat.sound());

  match animals.create(&Tag::new("bird"), "Tweety") {
    Ok(_) => panic!("bird was never registered"),
    Err(err) => println!("As expected: {err}"),
  }
}
