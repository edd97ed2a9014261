// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod identity;
pub mod preferences;

pub use identity::UserIdentity;
pub use preferences::{BookEntry, Facet, PreferenceRecord, most_recent};
