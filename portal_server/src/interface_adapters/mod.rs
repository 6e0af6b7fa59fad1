// Interface adapters: HTTP surface, token codec and storage backends.

pub mod handlers;
pub mod jwt;
pub mod memory_store;
pub mod middleware;
pub mod postgres_store;
pub mod protocol;
pub mod routes;
pub mod state;

pub use memory_store::InMemoryPortalStore;
pub use postgres_store::PostgresPortalStore;
pub use routes::app;
