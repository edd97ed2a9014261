// file: src/recommend/prompt.rs
// description: builds the recommendation prompt and shapes the model's reply
// reference: deterministic prompt assembly from preference facets

use crate::models::{Facet, PreferenceRecord, most_recent};

/// Read history included in the prompt; disliked items are always included in full.
pub const READ_HISTORY_LIMIT: usize = 5;

pub const RECOMMENDATION_COUNT: usize = 3;

pub const APOLOGY: &str = "Sorry, I couldn't generate book recommendations right now. \
                           Please try again in a moment.";

const EMPTY_PROFILE_NOTE: &str = "You haven't added any preferences yet. Add favorite genres, \
                                  authors or books you've read to get more personal picks.";

pub struct PromptBuilder;

impl PromptBuilder {
    /// Assemble the prompt. Clauses for empty facets are omitted; the order is fixed.
    pub fn build(record: &PreferenceRecord, name: &str) -> String {
        let mut lines = vec![format!(
            "Recommend exactly {} books for a reader named {}.",
            RECOMMENDATION_COUNT, name
        )];

        if !record.favorite_genres.is_empty() {
            lines.push(format!(
                "Their favorite genres are: {}.",
                record.favorite_genres.join(", ")
            ));
        }

        if !record.favorite_authors.is_empty() {
            lines.push(format!(
                "Their favorite authors are: {}.",
                record.favorite_authors.join(", ")
            ));
        }

        if !record.books_read.is_empty() {
            let recent: Vec<String> = most_recent(&record.books_read, READ_HISTORY_LIMIT)
                .iter()
                .map(|b| b.label())
                .collect();
            lines.push(format!("They have recently read: {}.", recent.join(", ")));
        }

        if !record.disliked_books.is_empty() {
            let disliked: Vec<String> = record.disliked_books.iter().map(|b| b.label()).collect();
            lines.push(format!("They did not enjoy: {}.", disliked.join(", ")));
        }

        if !record.disliked_authors.is_empty() {
            lines.push(format!(
                "They do not want books by: {}.",
                record.disliked_authors.join(", ")
            ));
        }

        lines.push(
            "For each recommendation give the title, the author and a one-line reason it fits \
             this reader. Do not recommend books they have already read or books by authors \
             they dislike."
                .to_string(),
        );

        lines.join("\n")
    }

    /// Wrap raw model output for the user. Returns the apology when there is no usable text.
    pub fn shape_response(record: &PreferenceRecord, name: &str, raw: Option<&str>) -> String {
        let text = match raw.map(str::trim) {
            Some(text) if !text.is_empty() => text,
            _ => return APOLOGY.to_string(),
        };

        format!(
            "Book recommendations for {}:\n\n{}\n\n---\n{}",
            name,
            text,
            Self::facet_note(record)
        )
    }

    fn facet_note(record: &PreferenceRecord) -> String {
        let used: Vec<String> = Facet::ALL
            .iter()
            .filter(|facet| record.count(**facet) > 0)
            .map(|facet| facet.describe_count(record.count(*facet)))
            .collect();

        if used.is_empty() {
            EMPTY_PROFILE_NOTE.to_string()
        } else {
            format!("Based on: {}", used.join(", "))
        }
    }
}
