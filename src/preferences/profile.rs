// file: src/preferences/profile.rs
// description: read-only text summary of a user's preference record
// reference: internal formatting

use crate::models::{PreferenceRecord, UserIdentity, most_recent};

const RECENT_READS_SHOWN: usize = 3;
const RECENT_DISLIKES_SHOWN: usize = 2;

/// Name to address the user by: stored name, then the session's name, then the user id.
pub fn preferred_name<'a>(record: &'a PreferenceRecord, identity: &'a UserIdentity) -> &'a str {
    if !record.display_name.is_empty() {
        &record.display_name
    } else if !identity.display_name.is_empty() {
        &identity.display_name
    } else {
        &identity.user_id
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None yet".to_string()
    } else {
        items.join(", ")
    }
}

pub fn render_profile(record: &PreferenceRecord, identity: &UserIdentity) -> String {
    let mut out = format!(
        "Reading profile for {}\n\n\
         Favorite genres: {}\n\
         Favorite authors: {}\n\
         Books read: {}",
        preferred_name(record, identity),
        list_or_none(&record.favorite_genres),
        list_or_none(&record.favorite_authors),
        record.books_read.len()
    );

    if !record.books_read.is_empty() {
        out.push_str("\n  Most recent:");
        for book in most_recent(&record.books_read, RECENT_READS_SHOWN) {
            out.push_str(&format!("\n  - {}", book.label()));
        }
    }

    out.push_str(&format!("\nDisliked books: {}", record.disliked_books.len()));
    if !record.disliked_books.is_empty() {
        out.push_str("\n  Most recent:");
        for book in most_recent(&record.disliked_books, RECENT_DISLIKES_SHOWN) {
            out.push_str(&format!("\n  - {}", book.label()));
        }
    }

    out.push_str(&format!(
        "\nDisliked authors: {}\n\nUser ID: {}",
        list_or_none(&record.disliked_authors),
        identity.user_id
    ));

    out
}
