// SPDX-License-Identifier: MIT

use super::*;

fn base() -> Command {
    Command::new(["claude"])
}

#[test]
fn session_resume_form_wins_when_session_id_and_flag_are_present() {
    let session_flag = Param::new(["--resume"]);
    let resume_flag = Param::new(["--continue"]);
    let prompt_flag = Param::new(["--prompt", "{prompt}"]);
    let req = PassthroughRequest { session_id: Some("sess-1"), resume: true, prompt: Some("hi") };
    let argv = build_passthrough_command(base(), &session_flag, &resume_flag, &prompt_flag, &req).build();
    assert_eq!(argv, vec!["claude", "--resume", "sess-1"]);
}

#[test]
fn generic_resume_flag_used_when_no_session_id_present() {
    let session_flag = Param::new(["--resume"]);
    let resume_flag = Param::new(["--continue"]);
    let prompt_flag = Param::new(["--prompt", "{prompt}"]);
    let req = PassthroughRequest { session_id: None, resume: true, prompt: Some("hi") };
    let argv = build_passthrough_command(base(), &session_flag, &resume_flag, &prompt_flag, &req).build();
    assert_eq!(argv, vec!["claude", "--continue"]);
}

#[test]
fn prompt_used_as_final_fallback() {
    let session_flag = Param::default();
    let resume_flag = Param::default();
    let prompt_flag = Param::new(["--prompt", "{prompt}"]);
    let req = PassthroughRequest { session_id: None, resume: false, prompt: Some("fix the bug") };
    let argv = build_passthrough_command(base(), &session_flag, &resume_flag, &prompt_flag, &req).build();
    assert_eq!(argv, vec!["claude", "--prompt", "fix the bug"]);
}

#[test]
fn bare_launch_when_nothing_is_set() {
    let session_flag = Param::default();
    let resume_flag = Param::default();
    let prompt_flag = Param::default();
    let req = PassthroughRequest::default();
    let argv = build_passthrough_command(base(), &session_flag, &resume_flag, &prompt_flag, &req).build();
    assert_eq!(argv, vec!["claude"]);
}
