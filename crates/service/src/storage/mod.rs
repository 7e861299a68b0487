//! Storage backends for saved payloads.
//!
//! Two implementations of the same [`SaveBackend`] contract: one file per
//! entry on disk, and an in-process map keyed by owner. The save operation
//! composes them durable-first.

pub mod backend;
pub mod durable;
pub mod memory;
pub mod resolver;
pub mod volatile;

pub use backend::SaveBackend;
pub use durable::DurableBackend;
pub use memory::{MemoryStore, StoredEntry};
pub use resolver::{probe, StorageMode};
pub use volatile::VolatileBackend;
