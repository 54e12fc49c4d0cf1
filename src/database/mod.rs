pub mod memory;
pub mod password;
pub mod postgres;
pub mod repository;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::{ProjectStore, StoreError, UserStore};
