// file: src/models/preferences.rs
// description: persisted per-user reading preference record
// reference: internal data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A book the user has read or disliked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookEntry {
    pub title: String,
    pub author: String,
    pub added_at: DateTime<Utc>,
}

impl BookEntry {
    pub fn new(title: &str, author: &str, added_at: DateTime<Utc>) -> Self {
        Self {
            title: title.to_string(),
            author: author.to_string(),
            added_at,
        }
    }

    /// Case-insensitive match on both title and author.
    pub fn matches(&self, title: &str, author: &str) -> bool {
        self.title.to_lowercase() == title.to_lowercase()
            && self.author.to_lowercase() == author.to_lowercase()
    }

    pub fn label(&self) -> String {
        format!("{} by {}", self.title, self.author)
    }
}

/// The single persisted document holding one user's reading preferences.
///
/// Every field defaults when absent so records written by older versions still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferenceRecord {
    pub display_name: String,
    pub favorite_genres: Vec<String>,
    pub favorite_authors: Vec<String>,
    pub books_read: Vec<BookEntry>,
    pub disliked_books: Vec<BookEntry>,
    pub disliked_authors: Vec<String>,
}

impl PreferenceRecord {
    pub fn count(&self, facet: Facet) -> usize {
        match facet {
            Facet::FavoriteGenres => self.favorite_genres.len(),
            Facet::FavoriteAuthors => self.favorite_authors.len(),
            Facet::BooksRead => self.books_read.len(),
            Facet::DislikedBooks => self.disliked_books.len(),
            Facet::DislikedAuthors => self.disliked_authors.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Facet::ALL.iter().all(|facet| self.count(*facet) == 0)
    }

    /// Copy with every facet emptied and the display name kept.
    pub fn cleared(&self) -> Self {
        Self {
            display_name: self.display_name.clone(),
            ..Self::default()
        }
    }
}

/// The last `limit` items, oldest first.
pub fn most_recent<T>(items: &[T], limit: usize) -> &[T] {
    &items[items.len().saturating_sub(limit)..]
}

/// One category of preference data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    FavoriteGenres,
    FavoriteAuthors,
    BooksRead,
    DislikedBooks,
    DislikedAuthors,
}

impl Facet {
    pub const ALL: [Facet; 5] = [
        Facet::FavoriteGenres,
        Facet::FavoriteAuthors,
        Facet::BooksRead,
        Facet::DislikedBooks,
        Facet::DislikedAuthors,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Facet::FavoriteGenres => "Favorite genres",
            Facet::FavoriteAuthors => "Favorite authors",
            Facet::BooksRead => "Books read",
            Facet::DislikedBooks => "Disliked books",
            Facet::DislikedAuthors => "Disliked authors",
        }
    }

    /// "1 favorite genre", "5 books read", ...
    pub fn describe_count(&self, count: usize) -> String {
        let (singular, plural) = match self {
            Facet::FavoriteGenres => ("favorite genre", "favorite genres"),
            Facet::FavoriteAuthors => ("favorite author", "favorite authors"),
            Facet::BooksRead => ("book read", "books read"),
            Facet::DislikedBooks => ("disliked book", "disliked books"),
            Facet::DislikedAuthors => ("disliked author", "disliked authors"),
        };
        format!("{} {}", count, if count == 1 { singular } else { plural })
    }
}
