// file: src/tools/schema.rs
// description: tool names, input schemas, validation and the text response envelope
// reference: https://docs.rs/schemars

use crate::error::{BookshelfError, Result};
use crate::utils::Validator;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NoParams {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenreParams {
    /// Genre to add, e.g. "mystery" or "science fiction"
    pub genre: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AuthorParams {
    /// Author's name as it should be remembered
    pub author: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BookParams {
    /// Book title
    pub title: String,
    /// Book author
    pub author: String,
}

/// Stable wire names of every tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    GetProfile,
    AddGenre,
    AddFavoriteAuthor,
    AddBookRead,
    AddDislikedBook,
    AddDislikedAuthor,
    ClearPreferences,
    GetBookRecommendations,
}

impl ToolName {
    pub const ALL: [ToolName; 8] = [
        ToolName::GetProfile,
        ToolName::AddGenre,
        ToolName::AddFavoriteAuthor,
        ToolName::AddBookRead,
        ToolName::AddDislikedBook,
        ToolName::AddDislikedAuthor,
        ToolName::ClearPreferences,
        ToolName::GetBookRecommendations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::GetProfile => "getProfile",
            ToolName::AddGenre => "addGenre",
            ToolName::AddFavoriteAuthor => "addFavoriteAuthor",
            ToolName::AddBookRead => "addBookRead",
            ToolName::AddDislikedBook => "addDislikedBook",
            ToolName::AddDislikedAuthor => "addDislikedAuthor",
            ToolName::ClearPreferences => "clearPreferences",
            ToolName::GetBookRecommendations => "getBookRecommendations",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolName::GetProfile => "Show your reading profile: genres, authors, books read and dislikes",
            ToolName::AddGenre => "Add a genre to your favorite genres",
            ToolName::AddFavoriteAuthor => "Add an author to your favorite authors",
            ToolName::AddBookRead => "Record a book you have read",
            ToolName::AddDislikedBook => "Record a book you did not enjoy so similar books are avoided",
            ToolName::AddDislikedAuthor => "Record an author whose books you want to avoid",
            ToolName::ClearPreferences => "Clear all reading preferences (your name is kept)",
            ToolName::GetBookRecommendations => {
                "Get three personalized book recommendations based on your preferences"
            }
        }
    }

    pub fn mutates(&self) -> bool {
        !matches!(
            self,
            ToolName::GetProfile | ToolName::GetBookRecommendations
        )
    }

    pub fn input_schema(&self) -> Value {
        let schema = match self {
            ToolName::AddGenre => schemars::schema_for!(GenreParams),
            ToolName::AddFavoriteAuthor | ToolName::AddDislikedAuthor => {
                schemars::schema_for!(AuthorParams)
            }
            ToolName::AddBookRead | ToolName::AddDislikedBook => schemars::schema_for!(BookParams),
            ToolName::GetProfile
            | ToolName::ClearPreferences
            | ToolName::GetBookRecommendations => schemars::schema_for!(NoParams),
        };
        serde_json::to_value(schema).unwrap_or_default()
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = BookshelfError;

    fn from_str(s: &str) -> Result<Self> {
        ToolName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| BookshelfError::UnknownTool(s.to_string()))
    }
}

/// A validated-on-dispatch tool invocation.
#[derive(Debug, Clone)]
pub enum ToolCall {
    GetProfile,
    AddGenre(GenreParams),
    AddFavoriteAuthor(AuthorParams),
    AddBookRead(BookParams),
    AddDislikedBook(BookParams),
    AddDislikedAuthor(AuthorParams),
    ClearPreferences,
    GetBookRecommendations,
}

fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(arguments)
        .map_err(|e| BookshelfError::validation("arguments", e.to_string()))
}

impl ToolCall {
    /// Resolve a tool by wire name and decode its arguments.
    pub fn parse(name: &str, arguments: Value) -> Result<Self> {
        let call = match name.parse::<ToolName>()? {
            ToolName::GetProfile => ToolCall::GetProfile,
            ToolName::AddGenre => ToolCall::AddGenre(parse_args(arguments)?),
            ToolName::AddFavoriteAuthor => ToolCall::AddFavoriteAuthor(parse_args(arguments)?),
            ToolName::AddBookRead => ToolCall::AddBookRead(parse_args(arguments)?),
            ToolName::AddDislikedBook => ToolCall::AddDislikedBook(parse_args(arguments)?),
            ToolName::AddDislikedAuthor => ToolCall::AddDislikedAuthor(parse_args(arguments)?),
            ToolName::ClearPreferences => ToolCall::ClearPreferences,
            ToolName::GetBookRecommendations => ToolCall::GetBookRecommendations,
        };
        Ok(call)
    }

    pub fn name(&self) -> ToolName {
        match self {
            ToolCall::GetProfile => ToolName::GetProfile,
            ToolCall::AddGenre(_) => ToolName::AddGenre,
            ToolCall::AddFavoriteAuthor(_) => ToolName::AddFavoriteAuthor,
            ToolCall::AddBookRead(_) => ToolName::AddBookRead,
            ToolCall::AddDislikedBook(_) => ToolName::AddDislikedBook,
            ToolCall::AddDislikedAuthor(_) => ToolName::AddDislikedAuthor,
            ToolCall::ClearPreferences => ToolName::ClearPreferences,
            ToolCall::GetBookRecommendations => ToolName::GetBookRecommendations,
        }
    }

    /// Genre and author inputs must contain something other than whitespace.
    /// Book titles and authors are accepted as given.
    pub fn validate(&self) -> Result<()> {
        match self {
            ToolCall::AddGenre(p) => Validator::validate_non_blank("genre", &p.genre),
            ToolCall::AddFavoriteAuthor(p) | ToolCall::AddDislikedAuthor(p) => {
                Validator::validate_non_blank("author", &p.author)
            }
            _ => Ok(()),
        }
    }
}

/// Tool metadata exposed for discovery.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    pub mutates_state: bool,
}

pub fn registry() -> Vec<ToolSpec> {
    ToolName::ALL
        .iter()
        .map(|tool| ToolSpec {
            name: tool.as_str(),
            description: tool.description(),
            input_schema: tool.input_schema(),
            mutates_state: tool.mutates(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// Standard text-content envelope returned by every tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub content: Vec<TextContent>,
}

impl ToolResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![TextContent {
                kind: "text".to_string(),
                text: text.into(),
            }],
        }
    }

    pub fn first_text(&self) -> &str {
        self.content.first().map(|c| c.text.as_str()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_names_roundtrip() {
        for tool in ToolName::ALL {
            assert_eq!(tool.as_str().parse::<ToolName>().unwrap(), tool);
        }
        assert!(matches!(
            "deleteEverything".parse::<ToolName>(),
            Err(BookshelfError::UnknownTool(_))
        ));
    }

    #[test]
    fn test_read_only_tools() {
        let read_only: Vec<&str> = ToolName::ALL
            .iter()
            .filter(|t| !t.mutates())
            .map(|t| t.as_str())
            .collect();
        assert_eq!(read_only, vec!["getProfile", "getBookRecommendations"]);
    }

    #[test]
    fn test_parse_book_call() {
        let call = ToolCall::parse(
            "addBookRead",
            json!({"title": "The Hobbit", "author": "Tolkien"}),
        )
        .unwrap();
        match call {
            ToolCall::AddBookRead(p) => {
                assert_eq!(p.title, "The Hobbit");
                assert_eq!(p.author, "Tolkien");
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_missing_field_is_validation_error() {
        let err = ToolCall::parse("addBookRead", json!({"title": "Dune"})).unwrap_err();
        assert!(matches!(err, BookshelfError::Validation { .. }));
        assert!(err.to_string().contains("author"));
    }

    #[test]
    fn test_wrong_type_is_validation_error() {
        let err = ToolCall::parse("addGenre", json!({"genre": 42})).unwrap_err();
        assert!(matches!(err, BookshelfError::Validation { .. }));
    }

    #[test]
    fn test_no_argument_tools_accept_null() {
        assert!(matches!(
            ToolCall::parse("getProfile", Value::Null).unwrap(),
            ToolCall::GetProfile
        ));
        assert!(matches!(
            ToolCall::parse("clearPreferences", json!({})).unwrap(),
            ToolCall::ClearPreferences
        ));
    }

    #[test]
    fn test_blank_genre_rejected() {
        let call = ToolCall::parse("addGenre", json!({"genre": "   "})).unwrap();
        match call.validate().unwrap_err() {
            BookshelfError::Validation { field, .. } => assert_eq!(field, "genre"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_blank_author_rejected_for_both_author_tools() {
        for name in ["addFavoriteAuthor", "addDislikedAuthor"] {
            let call = ToolCall::parse(name, json!({"author": ""})).unwrap();
            assert!(call.validate().is_err());
        }
    }

    #[test]
    fn test_registry_schemas_name_required_fields() {
        let specs = registry();
        assert_eq!(specs.len(), 8);

        let add_book = specs.iter().find(|s| s.name == "addBookRead").unwrap();
        let required = add_book.input_schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("title")));
        assert!(required.contains(&json!("author")));
        assert!(add_book.mutates_state);
    }

    #[test]
    fn test_response_envelope_shape() {
        let response = ToolResponse::text("hello");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"content": [{"type": "text", "text": "hello"}]})
        );
        assert_eq!(response.first_text(), "hello");
    }
}
