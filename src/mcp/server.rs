// file: src/mcp/server.rs
// description: MCP server exposing the preference tools over rmcp
// reference: https://docs.rs/rmcp

use crate::error::BookshelfError;
use crate::models::UserIdentity;
use crate::tools::{AuthorParams, BookParams, Dispatcher, GenreParams, ToolCall};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Map service errors onto MCP error codes. Input problems become `invalid_params`
/// with the offending field attached; everything else is an internal error.
pub fn to_mcp_error(err: BookshelfError) -> McpError {
    if !err.is_client_error() {
        warn!("Tool call failed: {}", err);
        return McpError::internal_error(err.to_string(), None);
    }

    let data = match &err {
        BookshelfError::Validation { field, .. } => json!({ "field": field }),
        BookshelfError::UnknownTool(name) => json!({ "tool": name }),
        _ => json!({}),
    };
    McpError::invalid_params(err.to_string(), Some(data))
}

/// One server per session; the identity is fixed when the session is set up.
#[derive(Clone)]
pub struct BookshelfMcp {
    dispatcher: Arc<Dispatcher>,
    identity: UserIdentity,
    tool_router: ToolRouter<Self>,
}

impl BookshelfMcp {
    pub fn new(dispatcher: Arc<Dispatcher>, identity: UserIdentity) -> Self {
        Self {
            dispatcher,
            identity,
            tool_router: Self::tool_router(),
        }
    }

    pub fn get_tool_router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }

    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    async fn run(&self, call: ToolCall) -> Result<CallToolResult, McpError> {
        info!("MCP: {} for {}", call.name(), self.identity.user_id);

        let response = self
            .dispatcher
            .dispatch(&self.identity, call)
            .await
            .map_err(to_mcp_error)?;

        let content = response
            .content
            .into_iter()
            .map(|block| Content::text(block.text))
            .collect();
        Ok(CallToolResult::success(content))
    }
}

#[tool_router]
impl BookshelfMcp {
    #[tool(
        name = "getProfile",
        description = "Show your reading profile: genres, authors, books read and dislikes"
    )]
    async fn get_profile(&self) -> Result<CallToolResult, McpError> {
        self.run(ToolCall::GetProfile).await
    }

    #[tool(name = "addGenre", description = "Add a genre to your favorite genres")]
    async fn add_genre(
        &self,
        Parameters(params): Parameters<GenreParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run(ToolCall::AddGenre(params)).await
    }

    #[tool(
        name = "addFavoriteAuthor",
        description = "Add an author to your favorite authors"
    )]
    async fn add_favorite_author(
        &self,
        Parameters(params): Parameters<AuthorParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run(ToolCall::AddFavoriteAuthor(params)).await
    }

    #[tool(name = "addBookRead", description = "Record a book you have read")]
    async fn add_book_read(
        &self,
        Parameters(params): Parameters<BookParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run(ToolCall::AddBookRead(params)).await
    }

    #[tool(
        name = "addDislikedBook",
        description = "Record a book you did not enjoy so similar books are avoided"
    )]
    async fn add_disliked_book(
        &self,
        Parameters(params): Parameters<BookParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run(ToolCall::AddDislikedBook(params)).await
    }

    #[tool(
        name = "addDislikedAuthor",
        description = "Record an author whose books you want to avoid"
    )]
    async fn add_disliked_author(
        &self,
        Parameters(params): Parameters<AuthorParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run(ToolCall::AddDislikedAuthor(params)).await
    }

    #[tool(
        name = "clearPreferences",
        description = "Clear all reading preferences (your name is kept)"
    )]
    async fn clear_preferences(&self) -> Result<CallToolResult, McpError> {
        self.run(ToolCall::ClearPreferences).await
    }

    #[tool(
        name = "getBookRecommendations",
        description = "Get three personalized book recommendations based on your preferences"
    )]
    async fn get_book_recommendations(&self) -> Result<CallToolResult, McpError> {
        self.run(ToolCall::GetBookRecommendations).await
    }
}

#[tool_handler]
impl ServerHandler for BookshelfMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Bookshelf keeps a reading profile for the signed-in user. Use addGenre, \
                 addFavoriteAuthor, addBookRead, addDislikedBook and addDislikedAuthor to build \
                 it up, getProfile to review it and getBookRecommendations for three \
                 personalized picks. clearPreferences starts over."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
