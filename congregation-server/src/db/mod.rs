//! Storage layer - document stores and typed record access
//!
//! # Design Principles
//!
//! - The store is schema-agnostic; records are validated on the way out
//! - One document per record, inserted in a single statement
//! - No retries, no batching
//! - The handle is injected, absent when unconfigured

pub mod collections;
pub mod memory;
pub mod pool;
pub mod postgres;
pub mod repo;
pub mod store;

pub use collections::CollectionMap;
pub use memory::MemoryStore;
pub use pool::create_pool;
pub use postgres::PgDocumentStore;
pub use repo::{ReadError, RecordRepo};
pub use store::{create_document, DocumentStore, StoreError, ID_FIELD};
