use fibre_registry::SingletonRegistry;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use std::thread;

// A connection that remembers which URL it was opened with.
struct DatabaseConnection {
  id: usize,
  database_url: String,
}

// Counts how many connections were ever opened.
static OPENED: AtomicUsize = AtomicUsize::new(0);

fn main() {
  let registry: Arc<SingletonRegistry<&'static str, String, DatabaseConnection>> =
    Arc::new(SingletonRegistry::new());

  // --- Registration ---
  // This factory will only be called ONCE, whatever the number of callers.
  registry
    .register("primary", |database_url: String| {
      println!("Opening connection to {database_url}...");
      Arc::new(DatabaseConnection {
        id: OPENED.fetch_add(1, Ordering::SeqCst),
        database_url,
      })
    })
    .unwrap();
  registry.freeze();

  // --- Resolution from several threads ---
  // Each thread asks with its own URL; only the winner's URL takes effect.
  let handles: Vec<_> = ["FOO", "BAR", "BAZ"]
    .into_iter()
    .map(|url| {
      let registry = Arc::clone(&registry);
      thread::spawn(move || registry.get_instance(&"primary", url.to_string()).unwrap())
    })
    .collect();

  let connections: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
  for connection in &connections {
    println!(
      "Connection {} -> {}",
      connection.id, connection.database_url
    );
  }

  assert_eq!(OPENED.load(Ordering::SeqCst), 1);
  assert!(connections.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
  println!("All threads share the same connection, as expected.");
}
