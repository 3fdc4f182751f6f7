//! Fyne Creator Hub Storage - persistence layer
//!
//! Per-entity repository traits with a PostgreSQL implementation, an
//! in-memory implementation backing the workflow engine tests, and a
//! change-notification feed for push-based observers.

pub mod changes;
pub mod db;
pub mod memory;
pub mod models;
pub mod repository;

pub use changes::{ChangeEvent, ChangeFeed, ChangeFilter, ChangeSubscription, EntityKind};
pub use db::DatabasePool;
pub use memory::MemoryStore;
