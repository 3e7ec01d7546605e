pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;
pub mod store;

pub use manager::DatabaseManager;
pub use memory::MemoryStore;
pub use repository::{Entity, Page, Repository};
pub use store::{DocumentStore, IndexSpec, StoreError, UpdateDoc, UpdateSummary};
