//! Infrastructure layer: on-device persistence for the cart.

pub mod paths;
pub mod sqlite_store;

pub use paths::default_db_path;
pub use sqlite_store::SqliteCartStore;
