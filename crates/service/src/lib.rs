//! Core domain for the per-user JSON save service.
//! - Resolves whether durable (filesystem) storage is usable per call.
//! - Replaces an owner's prior entries before writing the new payload.
//! - Falls back to an injected in-memory store when durable storage fails.

pub mod errors;
pub mod save;
pub mod storage;

pub use save::{sanitize_filename, BackendKind, SaveOutcome, SaveService, SavedListing};
pub use storage::{MemoryStore, StorageMode, StoredEntry};
