//! Integration tests for durable conversations on the file store.
//!
//! A conversation started by one dispatcher must resume in a fresh one
//! pointed at the same directory, the way it would after a restart.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use dialog_engine::adapters::{
    FileSessionStore, InMemoryAuthProvider, ScriptedClassifier, ScriptedSkillHandler,
    StaticContentSource,
};
use dialog_engine::application::state_codec::decode_conversation;
use dialog_engine::application::{
    build_registry, DialogServices, DialogSettings, Dispatcher, DispatcherSettings,
    ProcessTurnCommand, ProcessTurnResult, RetryPolicy,
};
use dialog_engine::domain::dialog::{Activity, DialogStackManager, DEFAULT_MAX_STEPS_PER_TURN};
use dialog_engine::domain::foundation::{ConversationId, UserId};
use dialog_engine::domain::interruption::{InterruptionPolicy, SkillCatalog};
use dialog_engine::ports::{ScopeKey, SessionStore, StateBlob};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn dispatcher(store: Arc<FileSessionStore>) -> Dispatcher {
    let services = DialogServices {
        auth: Arc::new(InMemoryAuthProvider::accepting_any_code()),
        content: Arc::new(StaticContentSource::new()),
        skills: Arc::new(ScriptedSkillHandler::new()),
        skill_catalog: SkillCatalog::default(),
        skill_retry: RetryPolicy::new(1, Duration::from_secs(1)),
    };
    let registry = build_registry(&services, &DialogSettings::default());
    Dispatcher::new(
        store,
        Arc::new(ScriptedClassifier::new()),
        services.auth.clone(),
        DialogStackManager::new(Arc::new(registry), DEFAULT_MAX_STEPS_PER_TURN),
        InterruptionPolicy::default(),
        SkillCatalog::default(),
        DispatcherSettings::default(),
    )
}

async fn say(dispatcher: &Dispatcher, text: &str) -> ProcessTurnResult {
    let mut activity = Activity::message(text);
    activity.conversation_id = Some(ConversationId::new("conv-1").unwrap());
    activity.from_id = Some(UserId::new("user-1").unwrap());
    dispatcher
        .handle(ProcessTurnCommand { activity })
        .await
        .unwrap()
}

fn texts(result: &ProcessTurnResult) -> Vec<String> {
    result
        .activities
        .iter()
        .filter_map(|a| a.text.clone())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn conversation_resumes_after_restart() {
    let dir = TempDir::new().unwrap();

    let before = dispatcher(Arc::new(FileSessionStore::new(dir.path())));
    say(&before, "hi").await;
    say(&before, "123456").await;
    drop(before);

    let after = dispatcher(Arc::new(FileSessionStore::new(dir.path())));
    let result = say(&after, "yes").await;

    assert_eq!(texts(&result), vec!["Do you accept our terms of use?"]);
}

#[tokio::test]
async fn user_record_is_only_rewritten_when_it_changes() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileSessionStore::new(dir.path()));
    let dispatcher = dispatcher(store.clone());

    say(&dispatcher, "hi").await;
    assert!(store.load(&ScopeKey::user("user-1")).await.unwrap().is_none());
    say(&dispatcher, "123456").await;

    let conversation = store
        .load(&ScopeKey::conversation("conv-1"))
        .await
        .unwrap()
        .unwrap();
    let user = store.load(&ScopeKey::user("user-1")).await.unwrap().unwrap();
    assert_eq!(conversation.revision, 2);
    assert_eq!(user.revision, 1);

    let decoded = decode_conversation(Some(conversation)).unwrap();
    assert_eq!(decoded.state.dialog_stack.dialog_ids(), vec!["main", "onboarding"]);
}

#[tokio::test]
async fn state_from_a_newer_schema_is_left_untouched() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileSessionStore::new(dir.path()));
    let key = ScopeKey::conversation("conv-1");
    let mut blob = StateBlob::new(serde_json::json!({ "dialogStack": [] }));
    blob.schema_version = 99;
    store.save(&key, &blob).await.unwrap();
    let dispatcher = dispatcher(store.clone());

    let result = say(&dispatcher, "hi").await;

    assert_eq!(
        texts(&result),
        vec!["Sorry, something went wrong on my side. Please try again."]
    );
    let stored = store.load(&key).await.unwrap().unwrap();
    assert_eq!(stored.schema_version, 99);
    assert_eq!(stored.revision, 1);
}
