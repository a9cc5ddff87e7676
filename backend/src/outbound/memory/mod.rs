//! In-process adapter implementing every repository port.
//!
//! Used when no database is configured and by integration tests. All three
//! repositories share one mutex-guarded state, so a trade resolution observes
//! and mutates offers and items in a single critical section.

mod store;

pub use store::InMemoryStore;
