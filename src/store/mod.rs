// file: src/store/mod.rs
// description: durable per-user preference storage
// reference: internal module structure

pub mod file;
pub mod kv;
pub mod preferences;

pub use file::FileKvStore;
pub use kv::{KeyValueStore, MemoryKvStore};
pub use preferences::{MutationOutcome, PreferenceStore};
