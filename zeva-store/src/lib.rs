pub mod app_config;
pub mod catalog_repo;
pub mod database;
pub mod memory;
pub mod notify;
pub mod order_repo;

pub use catalog_repo::PgCatalogRepository;
pub use database::DbClient;
pub use memory::MemoryStore;
pub use notify::WebhookNotifier;
pub use order_repo::PgOrderRepository;
