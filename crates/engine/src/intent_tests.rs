// SPDX-License-Identifier: MIT

use super::*;

#[yare::parameterized(
    workflow_step = { LaunchRequest { session_id: Some("s1".into()), workflow_step_id: Some("ws1".into()), ..Default::default() }, Intent::WorkflowStep },
    start_created_via_prompt = { LaunchRequest { session_id: Some("s1".into()), prompt: Some("hi".into()), ..Default::default() }, Intent::StartCreated },
    resume_session_alone = { LaunchRequest { session_id: Some("s1".into()), ..Default::default() }, Intent::Resume },
    prepare_workspace_without_prompt = { LaunchRequest { launch_workspace: true, ..Default::default() }, Intent::Prepare },
    start_when_workspace_and_prompt_both_set = { LaunchRequest { launch_workspace: true, prompt: Some("go".into()), ..Default::default() }, Intent::Start },
    start_when_nothing_set = { LaunchRequest::default(), Intent::Start },
)]
fn resolves_expected_intent(req: LaunchRequest, expected: Intent) {
    assert_eq!(resolve_intent(&req), expected);
}

#[test]
fn explicit_intent_always_wins() {
    let req = LaunchRequest { explicit_intent: Some(Intent::RestoreWorkspace), session_id: Some("s1".into()), prompt: Some("hi".into()), ..Default::default() };
    assert_eq!(resolve_intent(&req), Intent::RestoreWorkspace);
}

#[test]
fn session_plus_agent_profile_resolves_to_start_created() {
    let req = LaunchRequest { session_id: Some("s1".into()), agent_profile_id: Some("agt-1".into()), ..Default::default() };
    assert_eq!(resolve_intent(&req), Intent::StartCreated);
}
