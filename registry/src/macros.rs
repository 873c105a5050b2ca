//! Public macros for registering products in bulk.

/// Registers concrete product types with a [`ProductFactory`](crate::ProductFactory).
///
/// Each `tag => Type` pair binds `tag` to a constructor that calls
/// [`Construct::construct`](crate::Construct::construct) and boxes the result
/// as the factory's product type. A type that does not implement the product
/// interface is rejected at compile time.
///
/// Evaluates to `Result<(), Error<K>>`, stopping at the first rejected
/// registration.
///
/// # Examples
///
/// ```
/// use fibre_registry::{register_products, Construct, ProductFactory, Tag};
///
/// trait Animal: Send + Sync {
///   fn name(&self) -> &str;
/// }
///
/// struct Dog(String);
///
/// impl Construct<&'static str> for Dog {
///   fn construct(name: &'static str) -> Self {
///     Dog(name.to_string())
///   }
/// }
///
/// impl Animal for Dog {
///   fn name(&self) -> &str {
///     &self.0
///   }
/// }
///
/// let animals: ProductFactory<Tag, &'static str, dyn Animal> = ProductFactory::new();
/// register_products!(animals, "dog" => Dog).unwrap();
///
/// let dog = animals.create(&Tag::new("Dog"), "Rex").unwrap();
/// assert_eq!(dog.name(), "Rex");
/// ```
#[macro_export]
macro_rules! register_products {
  ($factory:expr, $($tag:expr => $product:ty),+ $(,)?) => {{
    let factory = &$factory;
    let mut outcome = ::std::result::Result::Ok(());
    $(
      if outcome.is_ok() {
        outcome = factory.register($tag, |args| {
          ::std::boxed::Box::new(<$product as $crate::Construct<_>>::construct(args))
        });
      }
    )+
    outcome
  }};
}
