// file: src/preferences/mod.rs
// description: preference tool business logic
// reference: internal module structure

pub mod mutators;
pub mod profile;

pub use mutators::{
    add_book_read, add_disliked_author, add_disliked_book, add_favorite_author, add_genre,
    clear_preferences, normalize_genre, normalize_name,
};
pub use profile::{preferred_name, render_profile};
