// file: src/preferences/mutators.rs
// description: pure add/clear operations over a preference record
// reference: idempotent append semantics with normalized dedup

use crate::models::{BookEntry, Facet, PreferenceRecord, most_recent};
use crate::store::MutationOutcome;
use chrono::{DateTime, Utc};

const RECENT_READS_IN_CONFIRMATION: usize = 3;

pub fn normalize_genre(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_string()
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None yet".to_string()
    } else {
        items.join(", ")
    }
}

pub fn add_genre(record: &PreferenceRecord, genre: &str) -> MutationOutcome {
    let genre = normalize_genre(genre);

    if record
        .favorite_genres
        .iter()
        .any(|existing| normalize_genre(existing) == genre)
    {
        return MutationOutcome::unchanged(format!(
            "'{}' is already in your favorites. Current genres: {}",
            genre,
            join_or_none(&record.favorite_genres)
        ));
    }

    let mut updated = record.clone();
    updated.favorite_genres.push(genre.clone());

    let message = if updated.favorite_genres.len() == 1 {
        format!(
            "Added '{}' to your favorite genres. Great start! Add a few more genres or authors \
             and your recommendations will get sharper.",
            genre
        )
    } else {
        format!(
            "Added '{}' to your favorite genres. You now have {}: {}",
            genre,
            Facet::FavoriteGenres.describe_count(updated.favorite_genres.len()),
            updated.favorite_genres.join(", ")
        )
    };

    MutationOutcome::updated(updated, message)
}

pub fn add_favorite_author(record: &PreferenceRecord, author: &str) -> MutationOutcome {
    let author = normalize_name(author);

    if record.favorite_authors.contains(&author) {
        return MutationOutcome::unchanged(format!(
            "'{}' is already in your favorite authors. Current authors: {}",
            author,
            join_or_none(&record.favorite_authors)
        ));
    }

    let mut updated = record.clone();
    updated.favorite_authors.push(author.clone());

    let message = if updated.favorite_authors.len() == 1 {
        format!(
            "Added {} to your favorite authors. Great start! Knowing who you love to read \
             helps a lot.",
            author
        )
    } else {
        format!(
            "Added {} to your favorite authors. You now have {}: {}",
            author,
            Facet::FavoriteAuthors.describe_count(updated.favorite_authors.len()),
            updated.favorite_authors.join(", ")
        )
    };

    MutationOutcome::updated(updated, message)
}

pub fn add_book_read(
    record: &PreferenceRecord,
    title: &str,
    author: &str,
    now: DateTime<Utc>,
) -> MutationOutcome {
    if record.books_read.iter().any(|b| b.matches(title, author)) {
        return MutationOutcome::unchanged(format!(
            "'{}' by {} is already in your reading list.",
            title, author
        ));
    }

    let mut updated = record.clone();
    updated.books_read.push(BookEntry::new(title, author, now));

    let total = updated.books_read.len();
    let mut message = format!(
        "Added '{}' by {} to your reading list. You have logged {} {}.\n\nRecently added:",
        title,
        author,
        total,
        if total == 1 { "book" } else { "books" }
    );
    for book in most_recent(&updated.books_read, RECENT_READS_IN_CONFIRMATION) {
        message.push_str(&format!("\n- {}", book.label()));
    }

    MutationOutcome::updated(updated, message)
}

pub fn add_disliked_book(
    record: &PreferenceRecord,
    title: &str,
    author: &str,
    now: DateTime<Utc>,
) -> MutationOutcome {
    if record.disliked_books.iter().any(|b| b.matches(title, author)) {
        return MutationOutcome::unchanged(format!(
            "'{}' by {} is already in your disliked books.",
            title, author
        ));
    }

    let mut updated = record.clone();
    updated.disliked_books.push(BookEntry::new(title, author, now));

    let message = format!(
        "Noted that you didn't enjoy '{}' by {}. I'll steer future recommendations away from \
         similar books. ({} total)",
        title,
        author,
        Facet::DislikedBooks.describe_count(updated.disliked_books.len())
    );

    MutationOutcome::updated(updated, message)
}

pub fn add_disliked_author(record: &PreferenceRecord, author: &str) -> MutationOutcome {
    let author = normalize_name(author);

    if record.disliked_authors.contains(&author) {
        return MutationOutcome::unchanged(format!(
            "'{}' is already in your disliked authors. Current list: {}",
            author,
            join_or_none(&record.disliked_authors)
        ));
    }

    let mut updated = record.clone();
    updated.disliked_authors.push(author.clone());

    let message = format!(
        "Noted. Books by {} will be left out of your recommendations. ({} total)",
        author,
        Facet::DislikedAuthors.describe_count(updated.disliked_authors.len())
    );

    MutationOutcome::updated(updated, message)
}

pub fn clear_preferences(record: &PreferenceRecord) -> MutationOutcome {
    let mut message = String::from("All reading preferences have been cleared:");
    for facet in Facet::ALL {
        message.push_str(&format!(
            "\n- {}: {} removed",
            facet.title(),
            record.count(facet)
        ));
    }
    message.push_str("\n\nYour name was kept. Add genres, authors or books to start fresh.");

    MutationOutcome::updated(record.cleared(), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn applied(record: &PreferenceRecord, outcome: MutationOutcome) -> PreferenceRecord {
        outcome.record.unwrap_or_else(|| record.clone())
    }

    #[test]
    fn test_add_genre_is_idempotent() {
        let mut record = PreferenceRecord::default();

        let first = add_genre(&record, "Mystery");
        assert!(first.is_mutation());
        assert!(first.message.contains("Great start"));
        record = applied(&record, first);

        let second = add_genre(&record, "Mystery");
        assert!(!second.is_mutation());
        assert!(second.message.contains("already in your favorites"));
        assert_eq!(record.favorite_genres, vec!["mystery"]);
    }

    #[test]
    fn test_add_genre_normalizes() {
        let outcome = add_genre(&PreferenceRecord::default(), " Sci-Fi ");
        assert_eq!(outcome.record.unwrap().favorite_genres, vec!["sci-fi"]);
    }

    #[test]
    fn test_add_genre_dedup_ignores_case() {
        let mut record = PreferenceRecord::default();
        record = applied(&record, add_genre(&record, "fantasy"));
        assert!(!add_genre(&record, "  FANTASY").is_mutation());
    }

    #[test]
    fn test_add_genre_matches_stored_case_variants() {
        let record = PreferenceRecord {
            favorite_genres: vec!["Fantasy".to_string(), " Horror ".to_string()],
            ..Default::default()
        };

        assert!(!add_genre(&record, "fantasy").is_mutation());
        assert!(!add_genre(&record, "HORROR").is_mutation());
        assert!(add_genre(&record, "noir").is_mutation());
    }

    #[test]
    fn test_second_genre_reports_count() {
        let mut record = PreferenceRecord::default();
        record = applied(&record, add_genre(&record, "fantasy"));
        let outcome = add_genre(&record, "noir");
        assert!(outcome.message.contains("2 favorite genres"));
        assert!(!outcome.message.contains("Great start"));
    }

    #[test]
    fn test_add_favorite_author_preserves_case() {
        let mut record = PreferenceRecord::default();
        record = applied(&record, add_favorite_author(&record, " Jane Austen "));
        assert_eq!(record.favorite_authors, vec!["Jane Austen"]);

        assert!(!add_favorite_author(&record, "Jane Austen").is_mutation());
        // uniqueness is on the exact trimmed value
        assert!(add_favorite_author(&record, "jane austen").is_mutation());
    }

    #[test]
    fn test_add_book_read_dedup_ignores_case() {
        let now = Utc::now();
        let mut record = PreferenceRecord::default();
        record = applied(&record, add_book_read(&record, "Dune", "Herbert", now));

        let dup = add_book_read(&record, "DUNE", "herbert", now);
        assert!(!dup.is_mutation());
        assert!(dup.message.contains("already in your reading list"));
        assert_eq!(record.books_read.len(), 1);
    }

    #[test]
    fn test_duplicate_book_keeps_original_timestamp() {
        let earlier = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let mut record = PreferenceRecord::default();
        record = applied(&record, add_book_read(&record, "Dune", "Herbert", earlier));
        record = applied(&record, add_book_read(&record, "Dune", "Herbert", Utc::now()));
        assert_eq!(record.books_read[0].added_at, earlier);
    }

    #[test]
    fn test_add_book_read_lists_last_three() {
        let now = Utc::now();
        let mut record = PreferenceRecord::default();
        for title in ["A", "B", "C"] {
            record = applied(&record, add_book_read(&record, title, "X", now));
        }
        let outcome = add_book_read(&record, "D", "X", now);
        assert_eq!(
            outcome.message,
            "Added 'D' by X to your reading list. You have logged 4 books.\n\n\
             Recently added:\n- B by X\n- C by X\n- D by X"
        );
    }

    #[test]
    fn test_disliked_book_is_independent_of_read_list() {
        let now = Utc::now();
        let mut record = PreferenceRecord::default();
        record = applied(&record, add_book_read(&record, "Dune", "Herbert", now));

        let outcome = add_disliked_book(&record, "Dune", "Herbert", now);
        assert!(outcome.is_mutation());
        assert!(outcome.message.contains("similar books"));
        record = applied(&record, outcome);

        assert!(!add_disliked_book(&record, "dune", "HERBERT", now).is_mutation());
        assert_eq!(record.books_read.len(), 1);
        assert_eq!(record.disliked_books.len(), 1);
    }

    #[test]
    fn test_add_disliked_author_trims() {
        let mut record = PreferenceRecord::default();
        record = applied(&record, add_disliked_author(&record, "  X "));
        assert_eq!(record.disliked_authors, vec!["X"]);
        assert!(!add_disliked_author(&record, "X").is_mutation());
    }

    #[test]
    fn test_clear_preserves_display_name() {
        let now = Utc::now();
        let mut record = PreferenceRecord {
            display_name: "Ada".to_string(),
            ..Default::default()
        };
        record = applied(&record, add_genre(&record, "noir"));
        record = applied(&record, add_favorite_author(&record, "Chandler"));
        record = applied(&record, add_book_read(&record, "Dune", "Herbert", now));
        record = applied(&record, add_disliked_book(&record, "Emma", "Austen", now));
        record = applied(&record, add_disliked_author(&record, "X"));

        let outcome = clear_preferences(&record);
        assert!(outcome.message.contains("- Favorite genres: 1 removed"));
        assert!(outcome.message.contains("- Disliked authors: 1 removed"));
        record = applied(&record, outcome);

        assert_eq!(record.display_name, "Ada");
        assert!(record.is_empty());
    }
}
