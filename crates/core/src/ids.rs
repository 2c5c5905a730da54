// SPDX-License-Identifier: MIT

//! Concrete identifier types used across the orchestrator.

crate::define_id! {
    /// Identifies a registered agent type in the catalog (e.g. "claude-code", "auggie").
    ///
    /// Unlike other IDs here this is usually a human-chosen slug rather than a
    /// generated nanoid, but it shares the same storage and trait surface.
    pub struct AgentTypeId("agt-");
}

crate::define_id! {
    /// Identifies a single agent session (one subprocess lifetime).
    pub struct SessionId("ses-");
}

crate::define_id! {
    /// Identifies a single prompt-to-idle turn within a session.
    pub struct OperationId("opr-");
}

crate::define_id! {
    /// Identifies a unit of work the orchestrator tracks a worktree and session for.
    pub struct TaskId("tsk-");
}

crate::define_id! {
    /// Identifies a git worktree record.
    pub struct WorktreeId("wkt-");
}

crate::define_id! {
    /// Identifies the repository a worktree was created from.
    pub struct RepositoryId("rep-");
}
