//! Integration tests for whole conversations through the dispatcher.
//!
//! Each test drives several turns against an in-memory store and scripted
//! classifier/skill adapters, then checks both the replies and what was
//! persisted between turns.

use std::sync::Arc;
use std::time::Duration;

use dialog_engine::adapters::{
    InMemoryAuthProvider, InMemorySessionStore, ScriptedClassifier, ScriptedSkillHandler,
    StaticContentSource,
};
use dialog_engine::application::dialogs::{LOGIN, MAIN, ONBOARDING, STRESS, SWITCH_SKILL};
use dialog_engine::application::state_codec::{decode_conversation, decode_user};
use dialog_engine::application::{
    build_registry, DialogServices, DialogSettings, Dispatcher, DispatcherSettings,
    ProcessTurnCommand, ProcessTurnResult, RetryPolicy,
};
use dialog_engine::domain::dialog::{Activity, DialogStackManager, DEFAULT_MAX_STEPS_PER_TURN};
use dialog_engine::domain::foundation::{ConversationId, UserId};
use dialog_engine::domain::interruption::{
    ClassifierModel, GlobalIntent, InterruptionPolicy, SkillCatalog, SkillDescriptor,
};
use dialog_engine::ports::{NluError, ScopeKey, SessionStore};

// =============================================================================
// Test Infrastructure
// =============================================================================

const SIGN_IN: &str = "Please sign in, then type the six-digit code you were given.";
const PRIVACY: &str = "Do you accept our privacy policy?";
const TERMS: &str = "Do you accept our terms of use?";
const NAME: &str = "What should I call you?";
const READING: &str = "What do you like to read about? List a few topics separated by commas.";
const MUSIC: &str =
    "What kind of music do you like? List a few genres or artists separated by commas.";
const MENU: &str = "How stressed do you feel right now?";
const STRESS_TIPS: &str = "I have some tips for you to help reduce the stress. Are you curious?";
const COUNSELOR: &str =
    "You can reach a counselor any time at 1-800-273-8255 or text HOME to 741741.";

fn catalog() -> SkillCatalog {
    SkillCatalog::new(vec![
        SkillDescriptor {
            id: "calendarSkill".to_string(),
            name: "Calendar".to_string(),
        },
        SkillDescriptor {
            id: "todoSkill".to_string(),
            name: "To Do".to_string(),
        },
    ])
}

fn dispatcher(store: InMemorySessionStore, nlu: ScriptedClassifier) -> Dispatcher {
    let services = DialogServices {
        auth: Arc::new(InMemoryAuthProvider::accepting_any_code()),
        content: Arc::new(StaticContentSource::new()),
        skills: Arc::new(ScriptedSkillHandler::new()),
        skill_catalog: catalog(),
        skill_retry: RetryPolicy::new(1, Duration::from_secs(1)),
    };
    let registry = build_registry(&services, &DialogSettings::default());
    Dispatcher::new(
        Arc::new(store),
        Arc::new(nlu),
        services.auth.clone(),
        DialogStackManager::new(Arc::new(registry), DEFAULT_MAX_STEPS_PER_TURN),
        InterruptionPolicy::default().with_shortcut(GlobalIntent::Stress, STRESS),
        catalog(),
        DispatcherSettings {
            nlu_retry: RetryPolicy::new(1, Duration::from_secs(1)),
            ..Default::default()
        },
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

async fn stack_ids(store: &InMemorySessionStore) -> Vec<String> {
    let blob = store.load(&ScopeKey::conversation("conv-1")).await.unwrap();
    decode_conversation(blob)
        .unwrap()
        .state
        .dialog_stack
        .dialog_ids()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Signs in and accepts both policies, leaving the name question pending.
async fn through_policies(dispatcher: &Dispatcher) {
    say(dispatcher, "hi").await;
    say(dispatcher, "123456").await;
    say(dispatcher, "yes").await;
    say(dispatcher, "yes").await;
}

/// Completes onboarding, leaving the stress menu pending.
async fn onboarded(dispatcher: &Dispatcher) {
    through_policies(dispatcher).await;
    say(dispatcher, "Sam").await;
    say(dispatcher, "history, science").await;
    say(dispatcher, "jazz").await;
}

// =============================================================================
// Login and onboarding
// =============================================================================

#[tokio::test]
async fn new_user_is_walked_through_login_and_onboarding() {
    let store = InMemorySessionStore::new();
    let dispatcher = dispatcher(store.clone(), ScriptedClassifier::new());

    assert_eq!(texts(&say(&dispatcher, "hi").await), vec![SIGN_IN]);
    assert_eq!(
        texts(&say(&dispatcher, "123456").await),
        vec!["You are now logged in.", PRIVACY]
    );
    assert_eq!(texts(&say(&dispatcher, "yes").await), vec![TERMS]);
    assert_eq!(texts(&say(&dispatcher, "yes").await), vec![NAME]);

    let result = say(&dispatcher, "Sam").await;

    assert_eq!(texts(&result), vec!["Hi Sam \u{1F600}", READING]);
    let conversation = decode_conversation(
        store
            .load(&ScopeKey::conversation("conv-1"))
            .await
            .unwrap(),
    )
    .unwrap();
    let top = conversation.state.dialog_stack.top().unwrap();
    assert_eq!(top.dialog_id, ONBOARDING);
    assert_eq!(top.step_values.text("name").as_deref(), Some("Sam"));

    let user = decode_user(store.load(&ScopeKey::user("user-1")).await.unwrap()).unwrap();
    assert_eq!(user.state.onboarding.name.as_deref(), Some("Sam"));
    assert!(user.state.onboarding.privacy_accepted);
    assert!(user.state.onboarding.terms_accepted);
}

#[tokio::test]
async fn finishing_onboarding_presents_the_menu() {
    let store = InMemorySessionStore::new();
    let dispatcher = dispatcher(store.clone(), ScriptedClassifier::new());
    through_policies(&dispatcher).await;
    say(&dispatcher, "Sam").await;

    assert_eq!(texts(&say(&dispatcher, "history, science").await), vec![MUSIC]);
    let result = say(&dispatcher, "jazz").await;

    let said = texts(&result);
    assert_eq!(said[0], "Thanks! You are all set. I'm glad to have you here.");
    assert_eq!(said[1], MENU);
    assert_eq!(stack_ids(&store).await, vec![MAIN.to_string()]);
}

#[tokio::test]
async fn declining_privacy_ends_the_conversation() {
    let store = InMemorySessionStore::new();
    let dispatcher = dispatcher(store.clone(), ScriptedClassifier::new());
    say(&dispatcher, "hi").await;
    say(&dispatcher, "123456").await;

    let result = say(&dispatcher, "no").await;

    assert_eq!(
        texts(&result),
        vec!["No problem. Come back whenever you are ready and we can start over."]
    );
    assert!(stack_ids(&store).await.is_empty());
}

#[tokio::test]
async fn wrong_code_fails_login() {
    let store = InMemorySessionStore::new();
    let dispatcher = dispatcher(store.clone(), ScriptedClassifier::new());
    say(&dispatcher, "hi").await;

    let result = say(&dispatcher, "not a code").await;

    assert_eq!(
        texts(&result),
        vec!["Login was not successful please try again."]
    );
    let user = decode_user(store.load(&ScopeKey::user("user-1")).await.unwrap()).unwrap();
    assert!(user.state.auth_token.is_none());
}

// =============================================================================
// Interruptions
// =============================================================================

#[tokio::test]
async fn cancel_restarts_from_the_root_in_the_same_turn() {
    let nlu = ScriptedClassifier::new().with_global("cancel", "l_general", "Cancel", 0.8);
    let store = InMemorySessionStore::new();
    let dispatcher = dispatcher(store.clone(), nlu);
    say(&dispatcher, "hi").await;
    say(&dispatcher, "123456").await;

    let result = say(&dispatcher, "cancel").await;

    assert_eq!(result.interrupted_by.as_deref(), Some("cancel"));
    assert_eq!(texts(&result), vec!["Okay, let's start over.", PRIVACY]);
    assert_eq!(
        stack_ids(&store).await,
        vec![MAIN.to_string(), ONBOARDING.to_string()]
    );
}

#[tokio::test]
async fn low_confidence_cancel_is_treated_as_an_answer() {
    let nlu = ScriptedClassifier::new().with_global("cancel", "l_general", "Cancel", 0.4);
    let dispatcher = dispatcher(InMemorySessionStore::new(), nlu);
    say(&dispatcher, "hi").await;
    say(&dispatcher, "123456").await;

    let result = say(&dispatcher, "cancel").await;

    assert_eq!(result.interrupted_by, None);
    assert_eq!(
        texts(&result),
        vec!["Please answer yes or no. Do you accept our privacy policy?"]
    );
}

#[tokio::test]
async fn repeat_replays_the_last_replies_without_advancing() {
    let nlu = ScriptedClassifier::new().with_global("say again", "l_general", "Repeat", 0.9);
    let store = InMemorySessionStore::new();
    let dispatcher = dispatcher(store.clone(), nlu);
    say(&dispatcher, "hi").await;
    let original = say(&dispatcher, "123456").await;

    let first = say(&dispatcher, "say again").await;
    let second = say(&dispatcher, "say again").await;

    assert!(first.replayed);
    assert_eq!(texts(&first), texts(&original));
    assert_eq!(texts(&second), texts(&original));
    assert_eq!(texts(&say(&dispatcher, "yes").await), vec![TERMS]);
}

#[tokio::test]
async fn confident_skill_match_inside_a_skill_asks_to_switch() {
    let nlu = ScriptedClassifier::new()
        .with(ClassifierModel::Dispatch, "book a meeting", "calendarSkill", 0.8)
        .with(ClassifierModel::Dispatch, "add a task", "todoSkill", 0.95);
    let store = InMemorySessionStore::new();
    let dispatcher = dispatcher(store.clone(), nlu);
    onboarded(&dispatcher).await;

    let relayed = say(&dispatcher, "book a meeting").await;
    assert_eq!(texts(&relayed), vec!["[calendarSkill] book a meeting"]);

    let result = say(&dispatcher, "add a task").await;

    assert_eq!(result.interrupted_by.as_deref(), Some("skill_switch"));
    assert_eq!(
        texts(&result),
        vec!["It sounds like you want To Do. Do you want to switch to it?"]
    );
    assert_eq!(
        stack_ids(&store).await,
        vec![
            MAIN.to_string(),
            "calendarSkill".to_string(),
            SWITCH_SKILL.to_string()
        ]
    );
}

#[tokio::test]
async fn skill_keeps_relaying_and_hands_over_on_accepted_switch() {
    let nlu = ScriptedClassifier::new()
        .with(ClassifierModel::Dispatch, "book a meeting", "calendarSkill", 0.8)
        .with(ClassifierModel::Dispatch, "add a task", "todoSkill", 0.95);
    let store = InMemorySessionStore::new();
    let dispatcher = dispatcher(store.clone(), nlu);
    onboarded(&dispatcher).await;

    say(&dispatcher, "book a meeting").await;
    let relayed = say(&dispatcher, "noon").await;
    assert_eq!(texts(&relayed), vec!["[calendarSkill] noon"]);
    assert_eq!(
        stack_ids(&store).await,
        vec![MAIN.to_string(), "calendarSkill".to_string()]
    );

    say(&dispatcher, "add a task").await;
    let switched = say(&dispatcher, "yes").await;

    assert_eq!(switched.interrupted_by, None);
    assert_eq!(texts(&switched), vec!["[todoSkill] add a task"]);
    assert_eq!(
        stack_ids(&store).await,
        vec![MAIN.to_string(), "todoSkill".to_string()]
    );
    let next = say(&dispatcher, "buy milk").await;
    assert_eq!(texts(&next), vec!["[todoSkill] buy milk"]);
}

#[tokio::test]
async fn declined_switch_stays_with_the_running_skill() {
    let nlu = ScriptedClassifier::new()
        .with(ClassifierModel::Dispatch, "book a meeting", "calendarSkill", 0.8)
        .with(ClassifierModel::Dispatch, "add a task", "todoSkill", 0.95);
    let store = InMemorySessionStore::new();
    let dispatcher = dispatcher(store.clone(), nlu);
    onboarded(&dispatcher).await;
    say(&dispatcher, "book a meeting").await;
    say(&dispatcher, "add a task").await;

    let declined = say(&dispatcher, "no").await;
    assert!(texts(&declined).is_empty());
    assert_eq!(
        stack_ids(&store).await,
        vec![MAIN.to_string(), "calendarSkill".to_string()]
    );

    let relayed = say(&dispatcher, "tomorrow").await;
    assert_eq!(texts(&relayed), vec!["[calendarSkill] tomorrow"]);
}

#[tokio::test]
async fn logout_signs_out_and_returns_to_login() {
    let nlu = ScriptedClassifier::new().with_global("log me out", "l_general", "Logout", 0.9);
    let store = InMemorySessionStore::new();
    let dispatcher = dispatcher(store.clone(), nlu);
    onboarded(&dispatcher).await;

    let result = say(&dispatcher, "log me out").await;

    assert_eq!(result.interrupted_by.as_deref(), Some("logout"));
    assert_eq!(texts(&result), vec!["You have been signed out.", SIGN_IN]);
    assert_eq!(
        stack_ids(&store).await,
        vec![MAIN.to_string(), LOGIN.to_string()]
    );
    let user = decode_user(store.load(&ScopeKey::user("user-1")).await.unwrap()).unwrap();
    assert!(user.state.auth_token.is_none());
    assert_eq!(user.state.onboarding.name.as_deref(), Some("Sam"));
}

#[tokio::test]
async fn escalate_shares_the_contact_and_asks_again() {
    let nlu =
        ScriptedClassifier::new().with_global("talk to a human", "l_general", "Escalate", 0.9);
    let store = InMemorySessionStore::new();
    let dispatcher = dispatcher(store.clone(), nlu);
    onboarded(&dispatcher).await;

    let result = say(&dispatcher, "talk to a human").await;

    assert_eq!(result.interrupted_by.as_deref(), Some("escalate"));
    assert_eq!(texts(&result), vec![COUNSELOR, MENU]);
    assert_eq!(stack_ids(&store).await, vec![MAIN.to_string()]);
}

#[tokio::test]
async fn stress_shortcut_runs_over_the_menu_and_returns_to_it() {
    let nlu = ScriptedClassifier::new().with_global("I'm stressed", "l_general", "Stress", 0.9);
    let store = InMemorySessionStore::new();
    let dispatcher = dispatcher(store.clone(), nlu);
    onboarded(&dispatcher).await;

    let result = say(&dispatcher, "I'm stressed").await;

    assert_eq!(result.interrupted_by.as_deref(), Some("shortcut"));
    assert_eq!(texts(&result), vec![STRESS_TIPS]);
    assert_eq!(
        stack_ids(&store).await,
        vec![MAIN.to_string(), STRESS.to_string()]
    );

    let back = say(&dispatcher, "no").await;
    assert_eq!(
        texts(&back),
        vec!["Okay. I'm here whenever you need me.", MENU]
    );
    assert_eq!(stack_ids(&store).await, vec![MAIN.to_string()]);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn classifier_outage_still_answers_the_pending_prompt() {
    let store = InMemorySessionStore::new();
    let healthy = dispatcher(store.clone(), ScriptedClassifier::new());
    say(&healthy, "hi").await;
    say(&healthy, "123456").await;

    let flaky = ScriptedClassifier::new().with_error(NluError::unavailable("503"));
    let outage = dispatcher(store.clone(), flaky);
    let result = say(&outage, "yes").await;

    assert_eq!(result.interrupted_by, None);
    assert_eq!(texts(&result), vec![TERMS]);
}

#[tokio::test]
async fn failed_save_keeps_the_previous_state() {
    let store = InMemorySessionStore::new();
    let dispatcher = dispatcher(store.clone(), ScriptedClassifier::new());
    say(&dispatcher, "hi").await;
    let before = store
        .load(&ScopeKey::conversation("conv-1"))
        .await
        .unwrap()
        .unwrap();

    store.set_fail_writes(true);
    let result = say(&dispatcher, "123456").await;
    store.set_fail_writes(false);

    assert_eq!(
        texts(&result),
        vec!["Sorry, I couldn't save where we were. Please send that again."]
    );
    let after = store
        .load(&ScopeKey::conversation("conv-1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after, before);

    let retried = say(&dispatcher, "123456").await;
    assert_eq!(texts(&retried), vec!["You are now logged in.", PRIVACY]);
}
