//! Property-based tests for the session state machine
//!
//! These tests verify key invariants hold across arbitrary event sequences.

use super::state::*;
use super::transition::*;
use super::*;
use crate::attachment::ImageData;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_image() -> impl Strategy<Value = ImageData> {
    "[a-zA-Z0-9+/]{4,16}".prop_map(|data| ImageData {
        data,
        media_type: "image/png".to_string(),
    })
}

fn arb_user_message_event() -> impl Strategy<Value = Event> {
    ("[a-zA-Z ]{0,30}", proptest::option::of(arb_image())).prop_map(|(text, image)| {
        Event::UserMessage {
            text,
            image,
            stamp: MessageStamp::now(),
        }
    })
}

fn arb_steps_planned_event() -> impl Strategy<Value = Event> {
    proptest::collection::vec("[A-Z][a-z]{2,10}", 0..7).prop_map(|labels| Event::StepsPlanned { labels })
}

fn arb_tutor_replied_event() -> impl Strategy<Value = Event> {
    ("[a-zA-Z ?]{0,40}", any::<bool>()).prop_map(|(text, advance_step)| Event::TutorReplied {
        text,
        stamp: MessageStamp::now(),
        advance_step,
    })
}

fn arb_tutor_failed_event() -> impl Strategy<Value = Event> {
    "[a-z ]{1,20}".prop_map(|error| Event::TutorFailed {
        error,
        stamp: MessageStamp::now(),
    })
}

fn arb_topic_event() -> impl Strategy<Value = Event> {
    "[A-Za-z &]{1,25}".prop_map(|label| Event::TopicSelected { label })
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        3 => arb_user_message_event(),
        2 => arb_steps_planned_event(),
        3 => arb_tutor_replied_event(),
        1 => arb_tutor_failed_event(),
        1 => arb_topic_event(),
    ]
}

/// Events a well-behaved runtime would deliver for one user send
fn arb_send_cycle() -> impl Strategy<Value = (Event, Vec<String>, Event)> {
    (
        "[a-zA-Z]{1,20}",
        proptest::collection::vec("[A-Z][a-z]{2,10}", 0..7),
        prop_oneof![arb_tutor_replied_event(), arb_tutor_failed_event()],
    )
        .prop_map(|(text, labels, outcome)| {
            let send = Event::UserMessage {
                text,
                image: None,
                stamp: MessageStamp::now(),
            };
            (send, labels, outcome)
        })
}

// ============================================================================
// Invariant Checkers
// ============================================================================

fn is_valid_state(state: &SessionState) -> bool {
    let current = state
        .steps
        .iter()
        .filter(|s| s.status == StepStatus::Current)
        .count();
    if current > 1 {
        return false;
    }

    // Completed steps form a prefix, followed by at most one current
    let mut seen_open = false;
    for step in &state.steps {
        match step.status {
            StepStatus::Completed if seen_open => return false,
            StepStatus::Completed => {}
            StepStatus::Current | StepStatus::Pending => seen_open = true,
        }
    }

    match &state.phase {
        Phase::Idle => true,
        // Planning only ever follows the opening message
        Phase::PlanningSteps { .. } => state.messages.len() == 1 && state.steps.is_empty(),
        Phase::AwaitingReply => state
            .messages
            .last()
            .is_some_and(|m| m.role == Role::User),
    }
}

fn completed_count(state: &SessionState) -> usize {
    state
        .steps
        .iter()
        .filter(|s| s.status == StepStatus::Completed)
        .count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: Valid state after any transition
    #[test]
    fn prop_transitions_preserve_validity(events in proptest::collection::vec(arb_event(), 0..25)) {
        let mut state = SessionState::new();
        for event in events {
            if let Ok(result) = transition(&state, event) {
                state = result.new_state;
                prop_assert!(is_valid_state(&state), "Invalid state: {:?}", state);
            }
        }
    }

    // Invariant 2: Transcript is append-only
    #[test]
    fn prop_messages_only_append(events in proptest::collection::vec(arb_event(), 0..25)) {
        let mut state = SessionState::new();
        for event in events {
            if let Ok(result) = transition(&state, event) {
                let next = result.new_state;
                prop_assert!(next.messages.len() >= state.messages.len());
                prop_assert_eq!(&next.messages[..state.messages.len()], &state.messages[..]);
                state = next;
            }
        }
    }

    // Invariant 3: Completed steps never regress, plan set once
    #[test]
    fn prop_steps_never_regress(events in proptest::collection::vec(arb_event(), 0..25)) {
        let mut state = SessionState::new();
        for event in events {
            if let Ok(result) = transition(&state, event) {
                let next = result.new_state;
                prop_assert!(completed_count(&next) >= completed_count(&state));
                if !state.steps.is_empty() {
                    let before: Vec<_> = state.steps.iter().map(|s| &s.label).collect();
                    let after: Vec<_> = next.steps.iter().map(|s| &s.label).collect();
                    prop_assert_eq!(before, after, "Plan labels changed after being set");
                }
                state = next;
            }
        }
    }

    // Invariant 4: Every accepted send ends idle with exactly one tutor turn
    #[test]
    fn prop_send_cycle_clears_loading(cycles in proptest::collection::vec(arb_send_cycle(), 1..6)) {
        let mut state = SessionState::new();
        for (send, labels, outcome) in cycles {
            let before = state.messages.len();

            state = transition(&state, send).unwrap().new_state;
            prop_assert!(state.is_loading());

            if matches!(state.phase, Phase::PlanningSteps { .. }) {
                state = transition(&state, Event::StepsPlanned { labels }).unwrap().new_state;
                prop_assert!(state.is_loading());
            }

            state = transition(&state, outcome).unwrap().new_state;
            prop_assert!(!state.is_loading());
            prop_assert_eq!(state.messages.len(), before + 2);
            prop_assert_eq!(state.messages.last().map(|m| m.role), Some(Role::Assistant));
        }
    }

    // Invariant 5: Busy sessions reject sends without changing
    #[test]
    fn prop_busy_rejects_messages(
        first in arb_user_message_event(),
        second in arb_user_message_event(),
    ) {
        if let Ok(result) = transition(&SessionState::new(), first) {
            let busy = result.new_state;
            prop_assert_eq!(transition(&busy, second).unwrap_err(), TransitionError::Busy);
        }
    }

    // Invariant 6: Topic selection touches nothing but the topic
    #[test]
    fn prop_topic_is_cosmetic(
        events in proptest::collection::vec(arb_event(), 0..15),
        topic in arb_topic_event(),
    ) {
        let mut state = SessionState::new();
        for event in events {
            if let Ok(result) = transition(&state, event) {
                state = result.new_state;
            }
        }

        let next = transition(&state, topic).unwrap().new_state;
        prop_assert_eq!(&next.messages, &state.messages);
        prop_assert_eq!(&next.steps, &state.steps);
        prop_assert_eq!(&next.phase, &state.phase);
        prop_assert!(next.current_topic.is_some());
    }
}
