//! Entertain dialog.
//!
//! Offers one kind of content at a time, rotating music → joke → article.
//! Every answer moves a counter: accepting shows the content and lowers the
//! refusal count, declining raises it. The dialog ends after
//! `max_showings` pieces of content, or asks for escalation once the
//! refusal count reaches `refusal_limit`. Between offers it replaces itself
//! with the counters carried in its options.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::{is_affirmative, ENTERTAIN};
use crate::domain::dialog::{
    Dialog, DialogError, DialogOptions, DialogResult, EntertainOptions, PromptSpec, StepContext,
    StepInput, StepOutcome,
};
use crate::domain::user::InterestCategory;
use crate::ports::{ContentKind, ContentSource};

const STEPS: &[&str] = &["offer", "process_answer", "ask_feedback"];

const REFUSALS: &str = "refusals";
const SHOWINGS: &str = "showings";
const CONTENT_INDEX: &str = "content_index";

pub struct EntertainDialog {
    content: Arc<dyn ContentSource>,
    refusal_limit: u32,
    max_showings: u32,
}

impl EntertainDialog {
    pub fn new(content: Arc<dyn ContentSource>, refusal_limit: u32, max_showings: u32) -> Self {
        Self {
            content,
            refusal_limit,
            max_showings,
        }
    }

    fn next_index(index: usize) -> usize {
        (index + 1) % ContentKind::ALL.len()
    }

    fn carried_options(ctx: &StepContext<'_>) -> DialogOptions {
        DialogOptions::Entertain(EntertainOptions {
            refusals: ctx.values.count(REFUSALS),
            showings: ctx.values.count(SHOWINGS),
            content_index: ctx.values.get_or_default(CONTENT_INDEX),
        })
    }

    async fn show(&self, ctx: &mut StepContext<'_>, kind: ContentKind) -> Result<(), DialogError> {
        let category = match kind {
            ContentKind::Article => Some(InterestCategory::Reading),
            ContentKind::Music => Some(InterestCategory::Music),
            ContentKind::Joke => None,
        };
        let interests: Vec<String> = category
            .map(|c| ctx.turn.user().onboarding.interests(c).to_vec())
            .unwrap_or_default();

        let activity = self
            .content
            .entertainment(kind, &interests)
            .await
            .map_err(|e| DialogError::step_failed(ENTERTAIN, "process_answer", e.to_string()))?;
        ctx.turn.send(activity);
        Ok(())
    }
}

#[async_trait]
impl Dialog for EntertainDialog {
    fn id(&self) -> &str {
        ENTERTAIN
    }

    fn steps(&self) -> &'static [&'static str] {
        STEPS
    }

    fn validate_options(&self, options: &DialogOptions) -> Result<(), DialogError> {
        match options {
            DialogOptions::None | DialogOptions::Entertain(_) => Ok(()),
            other => Err(DialogError::invalid_options(
                ENTERTAIN,
                format!("unexpected {} options", other.kind_name()),
            )),
        }
    }

    async fn run_step(
        &self,
        step: usize,
        ctx: &mut StepContext<'_>,
        input: StepInput,
    ) -> Result<StepOutcome, DialogError> {
        match step {
            0 => {
                let options = ctx.options.entertain();
                let index = options.content_index % ContentKind::ALL.len();
                ctx.values.insert(REFUSALS, options.refusals);
                ctx.values.insert(SHOWINGS, options.showings);
                ctx.values.insert(CONTENT_INDEX, index);

                Ok(StepOutcome::Suspend(PromptSpec::text(
                    "entertainOffer",
                    ContentKind::at(index).offer(),
                )))
            }
            1 => {
                let index: usize = ctx.values.get_or_default(CONTENT_INDEX);

                if is_affirmative(ctx.turn, &input) {
                    ctx.values.decrement(REFUSALS);
                    self.show(ctx, ContentKind::at(index)).await?;
                    ctx.values.insert(CONTENT_INDEX, Self::next_index(index));
                    let showings = ctx.values.increment(SHOWINGS);
                    if showings >= self.max_showings {
                        return Ok(StepOutcome::done());
                    }
                    return Ok(StepOutcome::Suspend(PromptSpec::silent_text("afterContent")));
                }

                let refusals = ctx.values.increment(REFUSALS);
                if refusals >= self.refusal_limit {
                    return Ok(StepOutcome::Complete(DialogResult::with_value(
                        json!({ "escalate": true }),
                    )));
                }
                ctx.values.insert(CONTENT_INDEX, Self::next_index(index));
                Ok(StepOutcome::replace(ENTERTAIN, Self::carried_options(ctx)))
            }
            _ => {
                let name = ctx.turn.user().display_name("buddy").to_string();
                ctx.turn.send_text(format!("Did you enjoy it {}?", name));
                Ok(StepOutcome::replace(ENTERTAIN, Self::carried_options(ctx)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::domain::dialog::{DialogStack, DialogStackManager, TurnStatus};
    use crate::domain::user::UserState;
    use proptest::prelude::*;

    async fn begin(manager: &DialogStackManager, options: EntertainOptions) -> DialogStack {
        let mut stack = DialogStack::new();
        let mut first = turn("hi", known_user("Sam"));
        manager
            .begin(
                &mut stack,
                &mut first,
                ENTERTAIN,
                DialogOptions::Entertain(options),
            )
            .await
            .unwrap();
        stack
    }

    fn counters(stack: &DialogStack) -> (u32, u32, usize) {
        let values = &stack.top().unwrap().step_values;
        (
            values.count(REFUSALS),
            values.count(SHOWINGS),
            values.get_or_default(CONTENT_INDEX),
        )
    }

    #[tokio::test]
    async fn first_offer_is_music() {
        let manager = default_manager();
        let mut stack = DialogStack::new();
        let mut first = turn("hi", UserState::new());

        manager
            .begin(&mut stack, &mut first, ENTERTAIN, DialogOptions::None)
            .await
            .unwrap();

        assert_eq!(texts(&first), vec![ContentKind::Music.offer()]);
    }

    #[tokio::test]
    async fn accepting_shows_content_then_asks_for_feedback() {
        let manager = default_manager();
        let mut stack = begin(&manager, EntertainOptions::default()).await;

        let (status, user, _) = reply(&manager, &mut stack, known_user("Sam"), "yes").await;
        assert_eq!(status, TurnStatus::Waiting);
        assert_eq!(counters(&stack), (0, 1, 1));
        assert_eq!(stack.top().unwrap().prompt_id(), Some("afterContent"));

        let (_, _, said) = reply(&manager, &mut stack, user, "haha").await;
        assert_eq!(said, vec!["Did you enjoy it Sam?", ContentKind::Joke.offer()]);
        assert_eq!(counters(&stack), (0, 1, 1));
    }

    #[tokio::test]
    async fn declining_rotates_to_next_kind() {
        let manager = default_manager();
        let mut stack = begin(&manager, EntertainOptions::default()).await;

        let (status, _, said) = reply(&manager, &mut stack, known_user("Sam"), "no").await;

        assert_eq!(status, TurnStatus::Waiting);
        assert_eq!(said, vec![ContentKind::Joke.offer()]);
        assert_eq!(counters(&stack), (1, 0, 1));
        assert_eq!(stack.depth(), 1);
    }

    #[tokio::test]
    async fn reaching_refusal_limit_asks_for_escalation() {
        let manager = default_manager();
        let mut stack = begin(&manager, EntertainOptions::default()).await;

        reply(&manager, &mut stack, known_user("Sam"), "no").await;
        let (status, _, _) = reply(&manager, &mut stack, known_user("Sam"), "nah").await;

        assert_eq!(
            status,
            TurnStatus::Complete(DialogResult::with_value(json!({"escalate": true})))
        );
    }

    #[tokio::test]
    async fn reaching_max_showings_completes() {
        let manager = default_manager();
        let mut stack = begin(
            &manager,
            EntertainOptions {
                refusals: 0,
                showings: 3,
                content_index: 1,
            },
        )
        .await;

        let (status, _, said) = reply(&manager, &mut stack, known_user("Sam"), "sure").await;

        assert_eq!(status, TurnStatus::Complete(DialogResult::empty()));
        assert_eq!(said.len(), 1);
    }

    #[tokio::test]
    async fn index_wraps_after_article() {
        let manager = default_manager();
        let mut stack = begin(
            &manager,
            EntertainOptions {
                refusals: 0,
                showings: 0,
                content_index: 2,
            },
        )
        .await;

        let (_, _, said) = reply(&manager, &mut stack, known_user("Sam"), "no").await;

        assert_eq!(said, vec![ContentKind::Music.offer()]);
    }

    proptest! {
        #[test]
        fn declines_end_the_loop_within_the_refusal_limit(
            start_refusals in 0u32..2,
            showings in 0u32..4,
            content_index in 0usize..6,
            answers in prop::collection::vec(
                prop::sample::select(vec!["no", "nope", "nah", "not now", "meh"]),
                2..8,
            ),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let manager = default_manager();
                let mut stack = begin(
                    &manager,
                    EntertainOptions { refusals: start_refusals, showings, content_index },
                )
                .await;
                let bound = (2 - start_refusals) as usize;

                let mut completed_after = None;
                for (n, answer) in answers.iter().enumerate() {
                    let (status, _, _) =
                        reply(&manager, &mut stack, known_user("Sam"), answer).await;
                    if status.is_complete() {
                        completed_after = Some(n + 1);
                        break;
                    }
                }

                prop_assert_eq!(completed_after, Some(bound));
                prop_assert!(stack.is_empty());
                Ok::<(), TestCaseError>(())
            })?;
        }
    }
}
