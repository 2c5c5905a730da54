// SPDX-License-Identifier: MIT

//! Intent resolution: turns a `launch_session` request into the verb that
//! decides what the orchestrator does next.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Start,
    Resume,
    Prepare,
    WorkflowStep,
    RestoreWorkspace,
    StartCreated,
}

#[derive(Debug, Clone, Default)]
pub struct LaunchRequest {
    pub explicit_intent: Option<Intent>,
    pub session_id: Option<String>,
    pub workflow_step_id: Option<String>,
    pub prompt: Option<String>,
    pub agent_profile_id: Option<String>,
    pub launch_workspace: bool,
}

/// Resolve the intent for a launch request. An explicit intent always wins;
/// otherwise fields are inspected in priority order.
pub fn resolve_intent(req: &LaunchRequest) -> Intent {
    if let Some(intent) = req.explicit_intent {
        return intent;
    }
    let has_session = req.session_id.is_some();
    if has_session && req.workflow_step_id.is_some() {
        return Intent::WorkflowStep;
    }
    if has_session && (req.prompt.is_some() || req.agent_profile_id.is_some()) {
        return Intent::StartCreated;
    }
    if has_session {
        return Intent::Resume;
    }
    if req.launch_workspace && req.prompt.is_none() {
        return Intent::Prepare;
    }
    Intent::Start
}

#[cfg(test)]
#[path = "intent_tests.rs"]
mod tests;
