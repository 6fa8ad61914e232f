//! Property-based tests for the persisted dialog stack.
//!
//! The stack is stored between turns, so whatever the engine builds must
//! survive serialization unchanged:
//! - Any stack, including an empty one and nested ones, round-trips
//! - Frame order is preserved
//! - Step counters never underflow

use proptest::prelude::*;
use serde_json::Value;

use super::instance::{AwaitingPrompt, DialogInstance, DialogStack};
use super::options::{DialogOptions, EntertainOptions, OnboardingMode, OnboardingOptions, SkillOptions};
use super::prompt::{recognize_choice, PromptSpec};
use super::values::{DialogResult, FoundChoice, StepInput, StepValues};

// ============================================================================
// Strategies
// ============================================================================

/// JSON values without nulls or floats.
fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        (0u32..1000).prop_map(|n| Value::Number(n.into())),
        "[a-zA-Z0-9 ]{0,20}".prop_map(Value::String),
    ]
}

fn arb_values() -> impl Strategy<Value = StepValues> {
    proptest::collection::btree_map("[a-z_]{1,10}", arb_value(), 0..5)
        .prop_map(|map| map.into_iter().collect())
}

fn arb_result() -> impl Strategy<Value = DialogResult> {
    prop_oneof![
        Just(DialogResult::empty()),
        arb_value().prop_map(DialogResult::with_value),
        ("[a-z]{3,10}", "[a-z ]{0,20}").prop_map(|(skill_id, reason)| {
            DialogResult::SkillUnavailable { skill_id, reason }
        }),
        ("[a-z]{3,10}", "[a-z ]{0,20}")
            .prop_map(|(dialog_id, error)| DialogResult::Failed { dialog_id, error }),
    ]
}

fn arb_input() -> impl Strategy<Value = StepInput> {
    prop_oneof![
        Just(StepInput::Empty),
        "[a-zA-Z ]{0,20}".prop_map(StepInput::Text),
        any::<bool>().prop_map(StepInput::Confirmed),
        (0usize..4, "[A-Za-z]{1,10}")
            .prop_map(|(index, value)| StepInput::Choice(FoundChoice { index, value })),
        arb_value().prop_map(StepInput::Value),
        arb_result().prop_map(StepInput::Child),
    ]
}

fn arb_options() -> impl Strategy<Value = DialogOptions> {
    prop_oneof![
        Just(DialogOptions::None),
        prop_oneof![Just(OnboardingMode::FirstRun), Just(OnboardingMode::UpdateProfile)]
            .prop_map(|mode| DialogOptions::Onboarding(OnboardingOptions { mode })),
        (0u32..3, 0u32..5, 0usize..3).prop_map(|(refusals, showings, content_index)| {
            DialogOptions::Entertain(EntertainOptions {
                refusals,
                showings,
                content_index,
            })
        }),
        "[a-z]{3,10}".prop_map(|skill_id| DialogOptions::Skill(SkillOptions {
            skill_id,
            pending_text: None,
        })),
    ]
}

fn arb_prompt() -> impl Strategy<Value = PromptSpec> {
    prop_oneof![
        ("[a-z]{1,8}", "[A-Za-z ?]{1,30}").prop_map(|(id, text)| PromptSpec::text(id, text)),
        ("[a-z]{1,8}", "[A-Za-z ?]{1,30}").prop_map(|(id, text)| PromptSpec::confirm(id, text)),
        "[a-z]{1,8}".prop_map(PromptSpec::open),
        ("[a-z]{1,8}", any::<bool>()).prop_map(|(id, free)| {
            let prompt = PromptSpec::choice(id, "Pick", &["Low", "Medium", "High"]);
            if free {
                prompt.allowing_free_text()
            } else {
                prompt
            }
        }),
    ]
}

fn arb_frame() -> impl Strategy<Value = DialogInstance> {
    (
        "[a-z_]{3,12}",
        0usize..8,
        arb_values(),
        proptest::option::of(arb_input()),
        arb_options(),
        proptest::option::of((arb_prompt(), 0usize..8)),
    )
        .prop_map(
            |(dialog_id, step_index, step_values, previous, options, awaiting)| DialogInstance {
                dialog_id,
                step_index,
                step_values,
                result_of_previous_step: previous,
                options,
                awaiting: awaiting.map(|(prompt, resume_at)| AwaitingPrompt { prompt, resume_at }),
            },
        )
}

fn arb_stack() -> impl Strategy<Value = DialogStack> {
    proptest::collection::vec(arb_frame(), 0..5).prop_map(DialogStack::from_frames)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn stack_survives_json_round_trip(stack in arb_stack()) {
        let json = serde_json::to_string(&stack).unwrap();
        let restored: DialogStack = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(restored, stack);
    }

    #[test]
    fn stack_survives_yaml_round_trip(stack in arb_stack()) {
        let yaml = serde_yaml::to_string(&stack).unwrap();
        let restored: DialogStack = serde_yaml::from_str(&yaml).unwrap();
        prop_assert_eq!(restored, stack);
    }

    #[test]
    fn nested_stack_keeps_frame_order(frames in proptest::collection::vec(arb_frame(), 3..6)) {
        let ids: Vec<String> = frames.iter().map(|f| f.dialog_id.clone()).collect();
        let stack = DialogStack::from_frames(frames);

        let json = serde_json::to_value(&stack).unwrap();
        let restored: DialogStack = serde_json::from_value(json).unwrap();

        let restored_ids: Vec<String> =
            restored.dialog_ids().into_iter().map(str::to_string).collect();
        prop_assert_eq!(restored_ids, ids);
    }

    #[test]
    fn counters_never_underflow(ops in proptest::collection::vec(any::<bool>(), 0..40)) {
        let mut values = StepValues::new();
        let mut expected: u32 = 0;
        for up in ops {
            if up {
                expected += 1;
                prop_assert_eq!(values.increment("refusals"), expected);
            } else {
                expected = expected.saturating_sub(1);
                prop_assert_eq!(values.decrement("refusals"), expected);
            }
        }
        prop_assert_eq!(values.count("refusals"), expected);
    }

    #[test]
    fn ordinal_choice_matches_position(ordinal in 1usize..=3) {
        let choices = vec!["Low".to_string(), "Medium".to_string(), "High".to_string()];
        let found = recognize_choice(&ordinal.to_string(), &choices).unwrap();
        prop_assert_eq!(found.index, ordinal - 1);
        prop_assert_eq!(&found.value, &choices[ordinal - 1]);
    }
}
