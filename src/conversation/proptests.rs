//! Property-based tests for conversation transitions
//!
//! Random operation sequences are replayed against a conversation and the
//! log invariants are checked after every step.

use super::*;
use crate::attachment::{ImageFile, PreviewRegistry, UploadedImage};
use crate::transport::{ApiResponse, ChatReply, Diagnosis};
use proptest::prelude::*;

// ============================================================================
// Operations
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Send { text: String, images: usize },
    Diagnose { text: String, images: usize },
    Reply { outcome: Result<Option<String>, String>, session: Option<String> },
    StaleReply,
    Clear,
}

fn arb_outcome() -> impl Strategy<Value = Result<Option<String>, String>> {
    prop_oneof![
        proptest::option::of("[a-zA-Z ]{0,30}").prop_map(Ok),
        "[a-zA-Z ]{1,30}".prop_map(Err),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        ("[a-z ]{0,12}", 0usize..3).prop_map(|(text, images)| Op::Send { text, images }),
        ("[a-z ]{0,12}", 0usize..3).prop_map(|(text, images)| Op::Diagnose { text, images }),
        (arb_outcome(), proptest::option::of("[a-z0-9]{0,8}"))
            .prop_map(|(outcome, session)| Op::Reply { outcome, session }),
        Just(Op::StaleReply),
        Just(Op::Clear),
    ]
}

fn images(previews: &PreviewRegistry, count: usize) -> Vec<UploadedImage> {
    (0..count)
        .map(|i| UploadedImage::new(ImageFile::new(format!("crop{i}.jpg"), vec![1u8]), previews))
        .collect()
}

fn to_event(op: Op, conversation: &Conversation, previews: &PreviewRegistry) -> Event {
    match op {
        Op::Send { text, images: n } => Event::UserMessage {
            submission: Submission::new(text, images(previews, n)),
            mode: SendMode::Chat,
        },
        Op::Diagnose { text, images: n } => Event::UserMessage {
            submission: Submission::new(text, images(previews, n)),
            mode: SendMode::Diagnose,
        },
        Op::Reply { outcome, session } => {
            let placeholder_id = conversation
                .pending_placeholder()
                .unwrap_or("no-such-placeholder")
                .to_string();
            let reply = match outcome {
                Ok(text) => Reply::Diagnosis(ApiResponse::success(Diagnosis {
                    session_id: session,
                    reply: text,
                    diagnoses: Vec::new(),
                })),
                Err(error) => Reply::Chat(ApiResponse::failure(error)),
            };
            Event::ReplyReceived {
                placeholder_id,
                reply,
            }
        }
        Op::StaleReply => Event::ReplyReceived {
            placeholder_id: "stale-placeholder".to_string(),
            reply: Reply::Chat(ApiResponse::success(ChatReply {
                reply: Some("late".to_string()),
                session_id: Some("stale-session".to_string()),
            })),
        },
        Op::Clear => Event::Clear,
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_log_invariants_hold(ops in proptest::collection::vec(arb_op(), 0..30)) {
        let previews = PreviewRegistry::new();
        let mut conversation = Conversation::new();

        for op in ops {
            let is_clear = matches!(op, Op::Clear);
            let before: Vec<String> = conversation.messages().iter().map(|m| m.id.clone()).collect();
            let event = to_event(op, &conversation, &previews);
            let is_submit = matches!(event, Event::UserMessage { .. });

            match transition(&mut conversation, event) {
                Ok(_) => {
                    if is_submit {
                        prop_assert_eq!(conversation.messages().len(), before.len() + 2);
                        prop_assert!(conversation.is_loading());
                    }
                }
                Err(_) => {
                    prop_assert!(is_submit);
                    prop_assert_eq!(conversation.messages().len(), before.len());
                }
            }

            let messages = conversation.messages();
            prop_assert!(!messages.is_empty());

            let loading = messages.iter().filter(|m| m.is_loading).count();
            prop_assert!(loading <= 1, "{} loading messages", loading);
            prop_assert_eq!(loading == 1, conversation.is_loading());

            if is_clear {
                prop_assert_eq!(messages.len(), 1);
                prop_assert_eq!(messages[0].content.as_str(), CLEARED_GREETING);
            } else {
                // Append-only: earlier entries keep their ids and order
                let prefix: Vec<&str> = messages.iter().take(before.len()).map(|m| m.id.as_str()).collect();
                let expected: Vec<&str> = before.iter().map(String::as_str).collect();
                prop_assert_eq!(prefix, expected);
            }
        }
    }

    #[test]
    fn prop_clear_issues_fresh_session(sends in 0usize..4) {
        let mut conversation = Conversation::new();
        for _ in 0..sends {
            let _ = transition(
                &mut conversation,
                Event::UserMessage { submission: Submission::text("help"), mode: SendMode::Chat },
            );
        }
        let before = conversation.session_id().to_string();

        transition(&mut conversation, Event::Clear).unwrap();

        prop_assert_ne!(conversation.session_id(), before.as_str());
        prop_assert_eq!(conversation.messages().len(), 1);
        prop_assert!(!conversation.is_loading());
    }

    #[test]
    fn prop_outbound_text_is_trimmed(text in "[ \t]{0,3}[a-z]{1,10}[ \t]{0,3}") {
        let mut conversation = Conversation::new();
        let result = transition(
            &mut conversation,
            Event::UserMessage { submission: Submission::text(text.clone()), mode: SendMode::Chat },
        ).unwrap();

        let outbound = result.effects.iter().find_map(|e| match e {
            Effect::SendRequest(out) => Some(out.clone()),
            Effect::NotifyObservers => None,
        });
        prop_assert_eq!(outbound.map(|o| o.message), Some(text.trim().to_string()));
        prop_assert_eq!(conversation.messages()[1].content.as_str(), text.as_str());
    }
}
