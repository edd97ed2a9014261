// file: src/tools/mod.rs
// description: tool registry, input schemas and dispatch
// reference: internal module structure

pub mod dispatcher;
pub mod schema;

pub use dispatcher::Dispatcher;
pub use schema::{
    AuthorParams, BookParams, GenreParams, NoParams, TextContent, ToolCall, ToolName,
    ToolResponse, ToolSpec, registry,
};
