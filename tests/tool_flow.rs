// file: tests/tool_flow.rs
// description: end-to-end tool flows through the dispatcher
// reference: integration tests

use async_trait::async_trait;
use bookshelf_mcp::recommend::APOLOGY;
use bookshelf_mcp::{
    BookshelfError, Dispatcher, FileKvStore, InferenceClient, MemoryKvStore, PreferenceStore,
    Recommender, Result, UserIdentity,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Captures the prompt it was sent and replies with a fixed list.
#[derive(Default)]
struct RecordingModel {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl InferenceClient for RecordingModel {
    async fn complete(&self, prompt: &str, _max_tokens: u32) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("1. Piranesi by Susanna Clarke\n2. Circe by Madeline Miller\n3. Uprooted by Naomi Novik"
            .to_string())
    }

    fn model_name(&self) -> &str {
        "recording"
    }
}

struct DownModel;

#[async_trait]
impl InferenceClient for DownModel {
    async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
        Err(BookshelfError::Inference("503 Service Unavailable".to_string()))
    }

    fn model_name(&self) -> &str {
        "down"
    }
}

fn memory_dispatcher(model: Arc<dyn InferenceClient>) -> Dispatcher {
    let store = PreferenceStore::new(Arc::new(MemoryKvStore::new()));
    Dispatcher::new(store, Recommender::new(model, 512))
}

async fn file_dispatcher(dir: &Path) -> Dispatcher {
    let kv = FileKvStore::new(dir.to_path_buf()).await.unwrap();
    Dispatcher::new(
        PreferenceStore::new(Arc::new(kv)),
        Recommender::new(Arc::new(DownModel), 512),
    )
}

async fn call(dispatcher: &Dispatcher, user: &UserIdentity, tool: &str, args: Value) -> String {
    dispatcher
        .invoke(user, tool, args)
        .await
        .unwrap_or_else(|e| panic!("{} failed: {}", tool, e))
        .first_text()
        .to_string()
}

#[tokio::test]
async fn fresh_user_builds_a_profile() {
    let dispatcher = memory_dispatcher(Arc::new(DownModel));
    let ada = UserIdentity::new("ada", "Ada");
    dispatcher.init_session(&ada).await;

    call(&dispatcher, &ada, "addGenre", json!({"genre": "Fantasy"})).await;
    call(
        &dispatcher,
        &ada,
        "addBookRead",
        json!({"title": "The Hobbit", "author": "J.R.R. Tolkien"}),
    )
    .await;

    let profile = call(&dispatcher, &ada, "getProfile", Value::Null).await;
    assert!(profile.starts_with("Reading profile for Ada"));
    assert!(profile.contains("Favorite genres: fantasy"));
    assert!(profile.contains("Books read: 1"));
    assert!(profile.contains("The Hobbit by J.R.R. Tolkien"));
    assert!(profile.ends_with("User ID: ada"));
}

#[tokio::test]
async fn profile_shows_three_most_recent_reads() {
    let dispatcher = memory_dispatcher(Arc::new(DownModel));
    let user = UserIdentity::new("reader", "");

    for n in 1..=6 {
        call(
            &dispatcher,
            &user,
            "addBookRead",
            json!({"title": format!("Book {}", n), "author": "Anon"}),
        )
        .await;
    }

    let profile = call(&dispatcher, &user, "getProfile", json!({})).await;
    assert!(profile.contains("Books read: 6"));
    for shown in ["Book 4", "Book 5", "Book 6"] {
        assert!(profile.contains(shown), "missing {}", shown);
    }
    for hidden in ["Book 1 ", "Book 2 ", "Book 3 "] {
        assert!(!profile.contains(hidden), "unexpected {}", hidden);
    }
}

#[tokio::test]
async fn duplicate_book_differing_in_case_is_not_added() {
    let dispatcher = memory_dispatcher(Arc::new(DownModel));
    let user = UserIdentity::new("reader", "");

    call(
        &dispatcher,
        &user,
        "addBookRead",
        json!({"title": "Dune", "author": "Frank Herbert"}),
    )
    .await;
    let second = call(
        &dispatcher,
        &user,
        "addBookRead",
        json!({"title": "DUNE", "author": "frank herbert"}),
    )
    .await;

    assert!(second.contains("already in your reading list"));
    let record = dispatcher.store().load(&user.storage_key()).await;
    assert_eq!(record.books_read.len(), 1);
    assert_eq!(record.books_read[0].title, "Dune");
}

#[tokio::test]
async fn recommendations_include_every_facet_in_the_prompt() {
    let model = Arc::new(RecordingModel::default());
    let dispatcher = memory_dispatcher(model.clone());
    let user = UserIdentity::new("sam", "Sam");
    dispatcher.init_session(&user).await;

    call(&dispatcher, &user, "addGenre", json!({"genre": "Mythology"})).await;
    call(&dispatcher, &user, "addFavoriteAuthor", json!({"author": "Madeline Miller"})).await;
    call(
        &dispatcher,
        &user,
        "addBookRead",
        json!({"title": "The Song of Achilles", "author": "Madeline Miller"}),
    )
    .await;
    call(
        &dispatcher,
        &user,
        "addDislikedBook",
        json!({"title": "Twilight", "author": "Stephenie Meyer"}),
    )
    .await;
    call(&dispatcher, &user, "addDislikedAuthor", json!({"author": "Dan Brown"})).await;

    let text = call(&dispatcher, &user, "getBookRecommendations", Value::Null).await;
    assert!(text.starts_with("Book recommendations for Sam:"));
    assert!(text.contains("Piranesi"));

    let prompts = model.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    for needle in [
        "Sam",
        "mythology",
        "Madeline Miller",
        "The Song of Achilles",
        "Twilight",
        "Dan Brown",
    ] {
        assert!(prompts[0].contains(needle), "prompt missing {}", needle);
    }
}

#[tokio::test]
async fn inference_outage_returns_apology() {
    let dispatcher = memory_dispatcher(Arc::new(DownModel));
    let user = UserIdentity::new("kim", "Kim");
    call(&dispatcher, &user, "addGenre", json!({"genre": "horror"})).await;
    let before = dispatcher.store().load(&user.storage_key()).await;

    let text = call(&dispatcher, &user, "getBookRecommendations", Value::Null).await;
    assert_eq!(text, APOLOGY);
    assert_eq!(dispatcher.store().load(&user.storage_key()).await, before);
}

#[tokio::test]
async fn clear_then_profile_keeps_name() {
    let dispatcher = memory_dispatcher(Arc::new(DownModel));
    let user = UserIdentity::new("lee", "Lee");
    dispatcher.init_session(&user).await;

    call(&dispatcher, &user, "addGenre", json!({"genre": "romance"})).await;
    call(&dispatcher, &user, "addDislikedAuthor", json!({"author": "Someone"})).await;
    call(&dispatcher, &user, "clearPreferences", Value::Null).await;

    let anonymous = UserIdentity::new("lee", "");
    let profile = call(&dispatcher, &anonymous, "getProfile", Value::Null).await;
    assert!(profile.starts_with("Reading profile for Lee"));
    assert!(profile.contains("Favorite genres: None yet"));
    assert!(profile.contains("Books read: 0"));
}

#[tokio::test]
async fn preferences_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let user = UserIdentity::new("github|42", "Octo");

    {
        let dispatcher = file_dispatcher(dir.path()).await;
        dispatcher.init_session(&user).await;
        call(&dispatcher, &user, "addGenre", json!({"genre": "Science Fiction"})).await;
        call(
            &dispatcher,
            &user,
            "addDislikedBook",
            json!({"title": "Ready Player One", "author": "Ernest Cline"}),
        )
        .await;
    }

    let dispatcher = file_dispatcher(dir.path()).await;
    let record = dispatcher.store().load(&user.storage_key()).await;
    assert_eq!(record.display_name, "Octo");
    assert_eq!(record.favorite_genres, vec!["science fiction"]);
    assert_eq!(record.disliked_books.len(), 1);
}

#[tokio::test]
async fn concurrent_adds_are_all_kept() {
    let dispatcher = Arc::new(memory_dispatcher(Arc::new(DownModel)));
    let user = UserIdentity::new("busy", "");

    let handles: Vec<_> = (0..10)
        .map(|n| {
            let dispatcher = Arc::clone(&dispatcher);
            let user = user.clone();
            tokio::spawn(async move {
                dispatcher
                    .invoke(&user, "addGenre", json!({"genre": format!("genre {}", n)}))
                    .await
            })
        })
        .collect();

    for handle in futures::future::join_all(handles).await {
        handle.unwrap().unwrap();
    }

    let record = dispatcher.store().load(&user.storage_key()).await;
    assert_eq!(record.favorite_genres.len(), 10);
}

#[tokio::test]
async fn invalid_input_is_rejected_before_storage() {
    let kv = Arc::new(MemoryKvStore::new());
    let dispatcher = Dispatcher::new(
        PreferenceStore::new(kv.clone()),
        Recommender::new(Arc::new(DownModel), 512),
    );
    let user = UserIdentity::new("val", "");

    let err = dispatcher
        .invoke(&user, "addFavoriteAuthor", json!({"author": "   "}))
        .await
        .unwrap_err();
    assert!(matches!(err, BookshelfError::Validation { ref field, .. } if field == "author"));

    let err = dispatcher
        .invoke(&user, "addBookRead", json!({"title": "No Author"}))
        .await
        .unwrap_err();
    assert!(err.is_client_error());

    let err = dispatcher
        .invoke(&user, "removeEverything", Value::Null)
        .await
        .unwrap_err();
    assert!(matches!(err, BookshelfError::UnknownTool(_)));

    assert!(kv.is_empty().await);
}

#[tokio::test]
async fn purge_next_to_a_running_server_sticks() {
    let dir = tempfile::tempdir().unwrap();
    let user = UserIdentity::new("ops", "Ops");

    let server = file_dispatcher(dir.path()).await;
    call(&server, &user, "addGenre", json!({"genre": "noir"})).await;

    // operator runs `purge` as a separate process on the same data dir
    let operator = file_dispatcher(dir.path()).await;
    assert!(operator.store().purge(&user.storage_key()).await.unwrap());

    call(&server, &user, "addGenre", json!({"genre": "horror"})).await;
    let record = operator.store().load(&user.storage_key()).await;
    assert_eq!(record.favorite_genres, vec!["horror"]);
    assert_eq!(record.display_name, "");
}
