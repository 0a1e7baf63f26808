//! Persistence layer: snapshot entities and the durable key-value store.

pub mod models;
pub mod snapshot_store;
pub mod storage;
