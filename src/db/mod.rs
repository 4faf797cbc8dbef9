pub mod feed;
pub mod memory;
pub mod postgres;
pub mod store;

pub use feed::{EventFeed, MemoryEventFeed, PgEventFeed};
pub use memory::MemoryStore;
pub use postgres::{create_pool, PgStore};
pub use store::EntityStore;

#[cfg(test)]
pub use feed::MockEventFeed;
#[cfg(test)]
pub use store::MockEntityStore;
