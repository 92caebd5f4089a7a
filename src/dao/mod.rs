/// Object-safe store trait and its backends.
pub mod entity_store;
/// Stored entities, enums and list filters.
pub mod models;
/// Errors shared by every storage backend.
pub mod storage;
