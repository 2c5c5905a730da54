// SPDX-License-Identifier: MIT

use super::*;

fn ids() -> (SessionId, OperationId) {
    (SessionId::from_string("ses-1"), OperationId::from_string("opr-1"))
}

#[test]
fn turn_completed_emits_complete() {
    let (session_id, operation_id) = ids();
    let mut state = NormalizerState::new();
    let events = translate_line(r#"{"type":"turn.completed"}"#, &session_id, &operation_id, &mut state);
    assert!(matches!(events.as_slice(), [AgentEvent::Complete { .. }]));
}

#[test]
fn turn_failed_emits_error_with_message() {
    let (session_id, operation_id) = ids();
    let mut state = NormalizerState::new();
    let events = translate_line(r#"{"type":"turn.failed","error":"context overflow"}"#, &session_id, &operation_id, &mut state);
    assert!(matches!(&events[0], AgentEvent::Error { message, .. } if message == "context overflow"));
}

#[test]
fn agent_message_item_started_then_completed_emits_once_each_suffix() {
    let (session_id, operation_id) = ids();
    let mut state = NormalizerState::new();
    let start = r#"{"type":"item.started","item":{"item_type":"agent_message","id":"m1","text":"Hel"}}"#;
    let events = translate_line(start, &session_id, &operation_id, &mut state);
    assert!(matches!(&events[0], AgentEvent::MessageChunk { text, .. } if text == "Hel"));

    let complete = r#"{"type":"item.completed","item":{"item_type":"agent_message","id":"m1","text":"Hello"}}"#;
    let events2 = translate_line(complete, &session_id, &operation_id, &mut state);
    assert!(matches!(&events2[0], AgentEvent::MessageChunk { text, .. } if text == "lo"));
}

#[test]
fn command_execution_started_then_completed_emits_call_then_update() {
    let (session_id, operation_id) = ids();
    let mut state = NormalizerState::new();
    let start = r#"{"type":"item.started","item":{"item_type":"command_execution","id":"c1","command":"ls -la"}}"#;
    let events = translate_line(start, &session_id, &operation_id, &mut state);
    assert!(matches!(&events[0], AgentEvent::ToolCall { tool_call_id, .. } if tool_call_id == "c1"));

    let done = r#"{"type":"item.completed","item":{"item_type":"command_execution","id":"c1","command":"ls -la","status":"completed"}}"#;
    let events2 = translate_line(done, &session_id, &operation_id, &mut state);
    assert!(matches!(&events2[0], AgentEvent::ToolUpdate { tool_status: ToolStatus::Complete, .. }));
}

#[test]
fn thread_resume_request_carries_thread_id() {
    let req = thread_resume_request("thr-42");
    assert_eq!(req["thread_id"], "thr-42");
    assert_eq!(req["type"], "thread.resume");
}
