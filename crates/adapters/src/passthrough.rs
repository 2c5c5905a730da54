// SPDX-License-Identifier: MIT

//! Passthrough mode: argv composition for TUI agents whose value is their
//! own terminal UI rather than a machine-readable event stream.

use conductor_core::{Command, Param};

#[derive(Debug, Clone, Default)]
pub struct PassthroughRequest<'a> {
    pub session_id: Option<&'a str>,
    pub resume: bool,
    pub prompt: Option<&'a str>,
}

/// Build the final argv for a passthrough launch:
/// 1. `session_id` set and `session_resume_flag` non-empty ⇒ session-resume form.
/// 2. Else `resume == true` and `resume_flag` non-empty ⇒ generic resume flag.
/// 3. Else a non-empty `prompt` ⇒ appended via `Command::prompt`.
pub fn build_passthrough_command(
    base: Command,
    session_resume_flag: &Param,
    resume_flag: &Param,
    prompt_flag: &Param,
    req: &PassthroughRequest<'_>,
) -> Command {
    if let Some(session_id) = req.session_id {
        if !session_resume_flag.is_empty() {
            return base.resume(session_resume_flag, session_id, false);
        }
    }
    if req.resume && !resume_flag.is_empty() {
        return base.flag(resume_flag.args.clone());
    }
    if let Some(prompt) = req.prompt {
        return base.prompt(prompt_flag, prompt);
    }
    base
}

#[cfg(test)]
#[path = "passthrough_tests.rs"]
mod tests;
