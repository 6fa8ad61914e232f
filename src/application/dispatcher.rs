//! Dispatcher - Runs one inbound activity as one turn.
//!
//! A turn loads the conversation and user records, classifies the message,
//! lets the interruption policy pick between a global command and the
//! active dialog, then saves the conversation together with the user record
//! (when the turn changed it) in one atomic write. Turns for
//! the same conversation are serialized; different conversations run in
//! parallel.
//!
//! Fatal engine errors never reach the caller as errors: the user gets a
//! single apology and nothing is saved, so the last durable state stays
//! authoritative.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, error, info, warn};

use super::dialogs::{MAIN, SWITCH_SKILL};
use super::resilience::RetryPolicy;
use super::state_codec::{decode_conversation, decode_user, encode, Loaded};
use crate::domain::dialog::{
    Activity, ActivityType, ConversationState, DialogError, DialogOptions, DialogResult,
    DialogStack, DialogStackManager, OnboardingMode, OnboardingOptions, SwitchSkillOptions,
    TurnContext, TurnStatus,
};
use crate::domain::foundation::{ConversationId, UserId};
use crate::domain::interruption::{
    ClassifierModel, GlobalIntent, Interruption, InterruptionPolicy, Recognition, SkillCatalog,
};
use crate::domain::user::UserState;
use crate::ports::{AuthProvider, NluClassifier, ScopeKey, SessionStore};

const APOLOGY: &str = "Sorry, something went wrong on my side. Please try again.";
const SAVE_FAILED: &str = "Sorry, I couldn't save where we were. Please send that again.";
const STARTING_OVER: &str = "Okay, let's start over.";
const SIGNED_OUT: &str = "You have been signed out.";
const HELP: &str = "I can help you handle stress, chat for a bit, or connect you with a person. \
                    Say \"cancel\" at any time to start over.";

/// Command carrying one inbound activity.
#[derive(Debug, Clone)]
pub struct ProcessTurnCommand {
    pub activity: Activity,
}

/// What the channel should send back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessTurnResult {
    pub activities: Vec<Activity>,
    /// Name of the global command that handled the turn, if any.
    pub interrupted_by: Option<String>,
    pub replayed: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("activity has no conversation id")]
    MissingConversation,

    #[error("activity has no sender id")]
    MissingSender,
}

/// Turn-level settings.
#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    /// Dialog begun when the stack is empty.
    pub root_dialog: String,
    pub default_locale: String,
    /// Dispatch label that sends the message on to the general model.
    pub general_label: String,
    pub escalation_contact: String,
    pub nlu_retry: RetryPolicy,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            root_dialog: MAIN.to_string(),
            default_locale: "en-us".to_string(),
            general_label: "l_general".to_string(),
            escalation_contact: super::dialogs::DialogSettings::default().escalation_contact,
            nlu_retry: RetryPolicy::default(),
        }
    }
}

/// Handler for inbound turns.
pub struct Dispatcher {
    store: Arc<dyn SessionStore>,
    nlu: Arc<dyn NluClassifier>,
    auth: Arc<dyn AuthProvider>,
    manager: DialogStackManager,
    policy: InterruptionPolicy,
    skill_catalog: SkillCatalog,
    settings: DispatcherSettings,
    locks: Mutex<HashMap<ConversationId, Arc<tokio::sync::Mutex<()>>>>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn SessionStore>,
        nlu: Arc<dyn NluClassifier>,
        auth: Arc<dyn AuthProvider>,
        manager: DialogStackManager,
        policy: InterruptionPolicy,
        skill_catalog: SkillCatalog,
        settings: DispatcherSettings,
    ) -> Self {
        Self {
            store,
            nlu,
            auth,
            manager,
            policy,
            skill_catalog,
            settings,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn handle(
        &self,
        cmd: ProcessTurnCommand,
    ) -> Result<ProcessTurnResult, DispatchError> {
        let activity = cmd.activity;
        let conversation_id = activity
            .conversation_id
            .clone()
            .ok_or(DispatchError::MissingConversation)?;
        let user_id = activity.from_id.clone().ok_or(DispatchError::MissingSender)?;

        if activity.kind == ActivityType::Trace {
            debug!(conversation_id = %conversation_id, "Ignoring trace activity");
            return Ok(ProcessTurnResult::default());
        }

        let turn_lock = self.conversation_lock(&conversation_id);
        let _guard = turn_lock.mutex().lock().await;
        Ok(self.run_turn(activity, conversation_id, user_id).await)
    }

    /// Number of conversations with a turn in flight or queued.
    pub fn active_conversations(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn conversation_lock(&self, conversation_id: &ConversationId) -> TurnLock<'_> {
        let mutex = self
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(conversation_id.clone())
            .or_default()
            .clone();
        TurnLock {
            dispatcher: self,
            conversation_id: conversation_id.clone(),
            mutex,
        }
    }

    async fn run_turn(
        &self,
        activity: Activity,
        conversation_id: ConversationId,
        user_id: UserId,
    ) -> ProcessTurnResult {
        let conversation_key = ScopeKey::conversation(conversation_id.as_str());
        let user_key = ScopeKey::user(user_id.as_str());

        let (mut conversation, user) = match self.load(&conversation_key, &user_key).await {
            Ok(loaded) => loaded,
            Err(err) => {
                error!(conversation_id = %conversation_id, error = %err, "Failed to load turn state");
                return Self::apology(activity, conversation_id, user_id, &self.settings.default_locale);
            }
        };
        conversation.state.begin_turn();

        let mut turn = TurnContext::new(
            activity,
            conversation_id.clone(),
            user_id,
            user.state.clone(),
            &self.settings.default_locale,
        );
        info!(
            conversation_id = %conversation_id,
            activity_id = %turn.activity_id(),
            depth = conversation.state.dialog_stack.depth(),
            "Turn started"
        );

        let recognition = self.recognize(&turn).await;
        turn.set_recognition(recognition);

        if let Err(err) = self.drive(&mut conversation.state, &mut turn).await {
            error!(
                conversation_id = %conversation_id,
                error = %err,
                code = %err.code(),
                "Turn aborted"
            );
            turn.reset_outbox(Vec::new());
            turn.send_text(APOLOGY);
            return Self::result(&mut turn, &conversation.state);
        }

        if !conversation.state.turn_flags.replayed {
            let activity_id = turn.activity_id().clone();
            conversation
                .state
                .record_outgoing(&activity_id, turn.outbox());
        }

        let changed_user = (turn.user() != &user.state).then(|| turn.user());
        let saved = self
            .save(
                (&conversation_key, &conversation.state, conversation.revision),
                (&user_key, changed_user, user.revision),
            )
            .await;
        if let Err(err) = saved {
            error!(conversation_id = %conversation_id, error = %err, "Failed to save turn state");
            turn.reset_outbox(Vec::new());
            turn.send_text(SAVE_FAILED);
            return Self::result(&mut turn, &conversation.state);
        }

        info!(
            conversation_id = %conversation_id,
            sent = turn.outbox().len(),
            depth = conversation.state.dialog_stack.depth(),
            "Turn finished"
        );
        Self::result(&mut turn, &conversation.state)
    }

    async fn load(
        &self,
        conversation_key: &ScopeKey,
        user_key: &ScopeKey,
    ) -> Result<(Loaded<ConversationState>, Loaded<UserState>), DialogError> {
        let conversation = decode_conversation(self.store.load(conversation_key).await?)?;
        let user = decode_user(self.store.load(user_key).await?)?;
        Ok((conversation, user))
    }

    /// Writes the records at the revisions they were read at.
    ///
    /// The user record is shared by every conversation of that user, so it
    /// is only written when this turn changed it.
    async fn save(
        &self,
        (conversation_key, conversation, conversation_revision): (&ScopeKey, &ConversationState, u64),
        (user_key, user, user_revision): (&ScopeKey, Option<&UserState>, u64),
    ) -> Result<(), DialogError> {
        let mut writes = vec![(
            conversation_key.clone(),
            encode(conversation, conversation_revision)?,
        )];
        match user {
            Some(user) => writes.push((user_key.clone(), encode(user, user_revision)?)),
            None => debug!(key = %user_key, "User state unchanged, not rewriting it"),
        }
        self.store.save_all(&writes).await?;
        Ok(())
    }

    /// Classifies the message text. Classifier failures mean "no classification".
    async fn recognize(&self, turn: &TurnContext) -> Recognition {
        if !turn.activity().is_message() {
            return Recognition::default();
        }
        let Some(text) = turn.text() else {
            return Recognition::default();
        };
        let locale = turn.locale();
        let retry = self.settings.nlu_retry;

        let dispatch = match retry
            .call("nlu.dispatch", || {
                self.nlu.classify(ClassifierModel::Dispatch, text, locale)
            })
            .await
        {
            Ok(classification) => classification,
            Err(err) => {
                warn!(
                    conversation_id = %turn.conversation_id(),
                    error = %err,
                    "Dispatch classification failed, continuing without it"
                );
                return Recognition::default();
            }
        };

        let general = if dispatch.is_label(&self.settings.general_label) {
            match retry
                .call("nlu.general", || {
                    self.nlu.classify(ClassifierModel::General, text, locale)
                })
                .await
            {
                Ok(classification) => Some(classification),
                Err(err) => {
                    warn!(
                        conversation_id = %turn.conversation_id(),
                        error = %err,
                        "General classification failed, continuing without it"
                    );
                    None
                }
            }
        } else {
            None
        };

        debug!(
            dispatch = %dispatch.label,
            confidence = dispatch.confidence,
            general = ?general.as_ref().map(|g| g.label.as_str()),
            "Message classified"
        );
        Recognition {
            dispatch: Some(dispatch),
            general,
        }
    }

    /// Applies the interruption verdict or continues the active dialog.
    async fn drive(
        &self,
        conversation: &mut ConversationState,
        turn: &mut TurnContext,
    ) -> Result<(), DialogError> {
        let active = self.manager.active_frame(&conversation.dialog_stack);
        let verdict = self
            .policy
            .evaluate(turn.recognition(), active.as_ref(), &self.skill_catalog);

        if verdict.is_interrupted() {
            info!(
                conversation_id = %turn.conversation_id(),
                interruption = verdict.name(),
                active = ?active.as_ref().map(|frame| frame.dialog_id.as_str()),
                "Turn interrupted"
            );
            conversation.turn_flags.interrupted_by = Some(verdict.name().to_string());
        }

        let stack = &mut conversation.dialog_stack;
        let status = match verdict {
            Interruption::None => {
                let continued = self.manager.continue_dialog(stack, turn).await;
                match continued {
                    Err(DialogError::NoActiveDialog) => self.begin_root(stack, turn).await?,
                    other => other?,
                }
            }
            Interruption::ConfirmSkillSwitch { skill_id } => {
                let skill_name = self
                    .skill_catalog
                    .get(&skill_id)
                    .map(|skill| skill.name.clone())
                    .unwrap_or_else(|| skill_id.clone());
                let options = DialogOptions::SwitchSkill(SwitchSkillOptions {
                    skill_id,
                    skill_name,
                    pending_text: turn.text().map(str::to_string),
                });
                self.manager.begin(stack, turn, SWITCH_SKILL, options).await?
            }
            Interruption::Restart { .. } => {
                turn.send_text(STARTING_OVER);
                self.manager.cancel_all(stack);
                self.begin_root(stack, turn).await?
            }
            Interruption::Logout => {
                if let Err(err) = self.auth.revoke(turn.user_id()).await {
                    warn!(user_id = %turn.user_id(), error = %err, "Token revocation failed");
                }
                turn.user_mut().sign_out();
                turn.send_text(SIGNED_OUT);
                self.manager.cancel_all(stack);
                self.begin_root(stack, turn).await?
            }
            Interruption::Help => {
                turn.send_text(HELP);
                self.manager.reprompt(stack, turn);
                return Ok(());
            }
            Interruption::Escalate => {
                turn.send_text(self.settings.escalation_contact.clone());
                self.manager.reprompt(stack, turn);
                return Ok(());
            }
            Interruption::Repeat => {
                turn.replay(conversation.replayable_activities());
                conversation.turn_flags.replayed = true;
                return Ok(());
            }
            Interruption::Shortcut { intent, dialog_id } => {
                let options = match intent {
                    GlobalIntent::UpdateProfile => DialogOptions::Onboarding(OnboardingOptions {
                        mode: OnboardingMode::UpdateProfile,
                    }),
                    _ => DialogOptions::None,
                };
                self.manager.begin(stack, turn, &dialog_id, options).await?
            }
        };

        if let TurnStatus::Complete(DialogResult::Failed { dialog_id, error }) = status {
            warn!(
                conversation_id = %turn.conversation_id(),
                dialog_id = %dialog_id,
                error = %error,
                "Root dialog failed"
            );
            turn.send_text(APOLOGY);
        }
        Ok(())
    }

    async fn begin_root(
        &self,
        stack: &mut DialogStack,
        turn: &mut TurnContext,
    ) -> Result<TurnStatus, DialogError> {
        self.manager
            .begin(stack, turn, &self.settings.root_dialog, DialogOptions::None)
            .await
    }

    fn result(turn: &mut TurnContext, conversation: &ConversationState) -> ProcessTurnResult {
        ProcessTurnResult {
            activities: turn.take_outbox(),
            interrupted_by: conversation.turn_flags.interrupted_by.clone(),
            replayed: conversation.turn_flags.replayed,
        }
    }

    /// Answer for a turn whose state could not even be loaded.
    fn apology(
        activity: Activity,
        conversation_id: ConversationId,
        user_id: UserId,
        locale: &str,
    ) -> ProcessTurnResult {
        let mut turn = TurnContext::new(activity, conversation_id, user_id, UserState::default(), locale);
        turn.send_text(APOLOGY);
        ProcessTurnResult {
            activities: turn.take_outbox(),
            ..Default::default()
        }
    }
}

/// Holds a conversation's turn mutex and drops the map entry with it.
///
/// Releasing on drop covers turns whose future is dropped mid-flight, such
/// as a request that hit its timeout.
struct TurnLock<'a> {
    dispatcher: &'a Dispatcher,
    conversation_id: ConversationId,
    mutex: Arc<tokio::sync::Mutex<()>>,
}

impl TurnLock<'_> {
    fn mutex(&self) -> &tokio::sync::Mutex<()> {
        &self.mutex
    }
}

impl Drop for TurnLock<'_> {
    /// Removes the entry once no other turn holds or waits on it.
    fn drop(&mut self) {
        let mut locks = self
            .dispatcher
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Two references left means the map's and this one.
        if locks
            .get(&self.conversation_id)
            .is_some_and(|entry| Arc::ptr_eq(entry, &self.mutex) && Arc::strong_count(entry) == 2)
        {
            locks.remove(&self.conversation_id);
        }
    }
}
