// SPDX-License-Identifier: MIT

use super::*;
use crate::permission::PermissionSetting;

fn auggie_base() -> Command {
    Command::new(["npx", "-y", "@augmentcode/auggie@0.15.0", "--acp"])
}

#[test]
fn auggie_new_session_argv_matches_expected() {
    let model_flag = Param::new(["--model"]);
    let permission_flag = Param::new(["--permission"]);
    let allow_indexing_settings = [PermissionSetting::cli_flag(
        "allow_indexing",
        "--allow-indexing",
        true,
    )];
    let mut values = HashMap::new();
    values.insert("allow_indexing".to_string(), true);

    let argv = auggie_base()
        .model(&model_flag, "sonnet4.5")
        .resume(&Param::default(), "", false)
        .permissions(
            &permission_flag,
            &[
                "launch-process".to_string(),
                "save-file".to_string(),
                "str-replace-editor".to_string(),
                "remove-files".to_string(),
            ],
            &PermissionOptions { auto_approve: false },
        )
        .settings(&allow_indexing_settings, &values)
        .build();

    assert_eq!(
        argv,
        vec![
            "npx",
            "-y",
            "@augmentcode/auggie@0.15.0",
            "--acp",
            "--model",
            "sonnet4.5",
            "--permission",
            "launch-process:ask-user",
            "--permission",
            "save-file:ask-user",
            "--permission",
            "str-replace-editor:ask-user",
            "--permission",
            "remove-files:ask-user",
            "--allow-indexing",
        ]
    );
}

#[yare::parameterized(
    empty_flag = { Param::default(), "sonnet4.5" },
    empty_model = { Param::new(["--model"]), "" },
)]
fn model_is_noop_when_gating_condition_false(flag: Param, model: &str) {
    let before = auggie_base();
    let after = before.clone().model(&flag, model);
    assert_eq!(before.build(), after.build());
}

#[yare::parameterized(
    empty_session = { Param::new(["--resume"]), "", false },
    native_resume = { Param::new(["--resume"]), "sess-1", true },
    empty_flag = { Param::default(), "sess-1", false },
)]
fn resume_is_noop_when_gating_condition_false(flag: Param, session_id: &str, native: bool) {
    let before = auggie_base();
    let after = before.clone().resume(&flag, session_id, native);
    assert_eq!(before.build(), after.build());
}

#[test]
fn resume_appends_flag_then_session_id() {
    let flag = Param::new(["--resume"]);
    let argv = Command::new(["agent"]).resume(&flag, "sess-123", false).build();
    assert_eq!(argv, vec!["agent", "--resume", "sess-123"]);
}

#[test]
fn resume_at_is_symmetric_to_resume() {
    let flag = Param::new(["--resume-at"]);
    let argv = Command::new(["agent"]).resume_at(&flag, "msg-uuid").build();
    assert_eq!(argv, vec!["agent", "--resume-at", "msg-uuid"]);

    let noop = Command::new(["agent"]).resume_at(&flag, "").build();
    assert_eq!(noop, vec!["agent"]);
}

#[test]
fn permissions_noop_on_auto_approve() {
    let flag = Param::new(["--permission"]);
    let argv = Command::new(["agent"])
        .permissions(
            &flag,
            &["save-file".to_string()],
            &PermissionOptions { auto_approve: true },
        )
        .build();
    assert_eq!(argv, vec!["agent"]);
}

#[test]
fn permissions_noop_on_empty_tools() {
    let flag = Param::new(["--permission"]);
    let argv = Command::new(["agent"])
        .permissions(&flag, &[], &PermissionOptions { auto_approve: false })
        .build();
    assert_eq!(argv, vec!["agent"]);
}

#[test]
fn prompt_appends_positionally_when_flag_empty() {
    let argv = Command::new(["agent"]).prompt(&Param::default(), "do the thing").build();
    assert_eq!(argv, vec!["agent", "do the thing"]);
}

#[test]
fn prompt_substitutes_placeholder_when_flag_present() {
    let flag = Param::new(["--prompt", "{prompt}", "--done"]);
    let argv = Command::new(["agent"]).prompt(&flag, "hello world").build();
    assert_eq!(argv, vec!["agent", "--prompt", "hello world", "--done"]);
}

#[test]
fn prompt_is_noop_on_empty_prompt() {
    let flag = Param::new(["--prompt", "{prompt}"]);
    let argv = Command::new(["agent"]).prompt(&flag, "").build();
    assert_eq!(argv, vec!["agent"]);
}

#[test]
fn settings_skips_unsupported_and_disabled() {
    let settings = [
        PermissionSetting::unsupported("sandboxed"),
        PermissionSetting::cli_flag("verbose", "--verbose", false),
        PermissionSetting::cli_flag("yolo", "--dangerously-skip-permissions", true),
    ];
    let mut values = HashMap::new();
    values.insert("yolo".to_string(), true);
    values.insert("verbose".to_string(), false);

    let argv = Command::new(["agent"]).settings(&settings, &values).build();
    assert_eq!(argv, vec!["agent", "--dangerously-skip-permissions"]);
}

#[test]
fn settings_splits_multi_word_flag_without_explicit_value() {
    let settings = [PermissionSetting::cli_flag("mode", "--mode strict", true)];
    let values = HashMap::new(); // falls back to default_value=true
    let argv = Command::new(["agent"]).settings(&settings, &values).build();
    assert_eq!(argv, vec!["agent", "--mode", "strict"]);
}

#[test]
fn settings_uses_explicit_cli_flag_value_over_splitting() {
    let settings = [PermissionSetting::cli_flag("mode", "--mode", true).with_value("strict")];
    let values = HashMap::new();
    let argv = Command::new(["agent"]).settings(&settings, &values).build();
    assert_eq!(argv, vec!["agent", "--mode", "strict"]);
}

#[test]
fn with_clones_instead_of_mutating_seed() {
    let base = auggie_base();
    let snapshot = base.build();
    let base = Command::new(snapshot.clone());
    let _extended = base.with().flag(["--extra"]);
    assert_eq!(base.build(), snapshot);
}

#[test]
fn builder_call_order_is_preserved() {
    let model_flag = Param::new(["--model"]);
    let permission_flag = Param::new(["--permission"]);
    let a = Command::new(["agent"])
        .model(&model_flag, "x")
        .flag(["--a"])
        .build();
    let b = Command::new(["agent"])
        .flag(["--a"])
        .model(&model_flag, "x")
        .build();
    assert_ne!(a, b);
    let _ = &permission_flag;
}

proptest::proptest! {
    #[test]
    fn model_noop_iff_gating_empty(model in "[a-z0-9]{0,8}") {
        let empty_flag = Param::default();
        let before = auggie_base();
        let after = before.clone().model(&empty_flag, &model);
        proptest::prop_assert_eq!(before.build(), after.build());
    }
}
