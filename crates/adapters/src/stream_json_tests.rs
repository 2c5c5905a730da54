// SPDX-License-Identifier: MIT

use super::*;
use conductor_core::ids::{OperationId, SessionId};

fn ids() -> (SessionId, OperationId) {
    (SessionId::from_string("ses-1"), OperationId::from_string("opr-1"))
}

#[test]
fn result_line_emits_complete() {
    let (session_id, operation_id) = ids();
    let mut state = NormalizerState::new();
    let events = translate_line(r#"{"type":"result","subtype":"success"}"#, &session_id, &operation_id, &mut state);
    assert!(matches!(events.as_slice(), [AgentEvent::Complete { .. }]));
}

#[test]
fn assistant_text_block_emits_message_chunk_once() {
    let (session_id, operation_id) = ids();
    let mut state = NormalizerState::new();
    let raw = r#"{"type":"assistant","message":{"content":[{"type":"text","text":"hello"}]}}"#;
    let events = translate_line(raw, &session_id, &operation_id, &mut state);
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], AgentEvent::MessageChunk { text, .. } if text == "hello"));
}

#[test]
fn assistant_bare_string_content_is_tolerated() {
    let (session_id, operation_id) = ids();
    let mut state = NormalizerState::new();
    let raw = r#"{"type":"assistant","message":{"content":"plain text"}}"#;
    let events = translate_line(raw, &session_id, &operation_id, &mut state);
    assert!(matches!(&events[0], AgentEvent::MessageChunk { text, .. } if text == "plain text"));
}

#[test]
fn tool_use_then_tool_result_emits_call_then_update() {
    let (session_id, operation_id) = ids();
    let mut state = NormalizerState::new();
    let use_raw = r#"{"type":"assistant","message":{"content":[{"type":"tool_use","id":"t1","name":"bash","input":{"command":"ls"}}]}}"#;
    let use_events = translate_line(use_raw, &session_id, &operation_id, &mut state);
    assert!(matches!(&use_events[0], AgentEvent::ToolCall { tool_call_id, .. } if tool_call_id == "t1"));

    let result_raw = r#"{"type":"assistant","message":{"content":[{"type":"tool_result","tool_use_id":"t1","content":"ok","is_error":false}]}}"#;
    let result_events = translate_line(result_raw, &session_id, &operation_id, &mut state);
    assert!(matches!(
        &result_events[0],
        AgentEvent::ToolUpdate { tool_call_id, tool_status: ToolStatus::Complete, .. } if tool_call_id == "t1"
    ));
}

#[test]
fn system_and_control_lines_produce_no_events() {
    let (session_id, operation_id) = ids();
    let mut state = NormalizerState::new();
    assert!(translate_line(r#"{"type":"system","subtype":"init"}"#, &session_id, &operation_id, &mut state).is_empty());
    assert!(translate_line(
        r#"{"type":"control_request","request_id":"r1","subtype":"can_use_tool","request":{}}"#,
        &session_id,
        &operation_id,
        &mut state
    )
    .is_empty());
}

#[test]
fn malformed_line_produces_no_events_and_does_not_panic() {
    let (session_id, operation_id) = ids();
    let mut state = NormalizerState::new();
    assert!(translate_line("not json", &session_id, &operation_id, &mut state).is_empty());
}
