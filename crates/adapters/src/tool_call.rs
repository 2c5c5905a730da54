// SPDX-License-Identifier: MIT

//! Maps dialect-specific tool invocations to the canonical
//! [`NormalizedPayload`] variants.

use conductor_core::NormalizedPayload;
use serde_json::Value;

fn str_field<'a>(input: &'a Value, key: &str) -> Option<&'a str> {
    input.get(key).and_then(Value::as_str)
}

fn u32_field(input: &Value, key: &str) -> Option<u32> {
    input.get(key).and_then(Value::as_u64).map(|v| v as u32)
}

fn bool_field(input: &Value, key: &str) -> bool {
    input.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Normalize a tool invocation by its dialect-specific name. Unknown names
/// map to `generic` with the raw input preserved verbatim.
pub fn normalize_tool_input(tool_name: &str, input: &Value) -> NormalizedPayload {
    match tool_name {
        "bash" | "Bash" | "shell" | "execute" => {
            let command = str_field(input, "command").unwrap_or_default().to_string();
            let cwd = str_field(input, "cwd").map(String::from);
            let background = bool_field(input, "background");
            let mut payload = NormalizedPayload::shell_exec(command, cwd, background);
            if let NormalizedPayload::ShellExec { description, timeout_seconds, .. } = &mut payload {
                *description = str_field(input, "description").map(String::from);
                *timeout_seconds = u32_field(input, "timeout");
            }
            payload
        }
        "Write" | "edit" | "Edit" | "write" => {
            let path = str_field(input, "file_path").or_else(|| str_field(input, "path")).unwrap_or_default();
            let diff = str_field(input, "diff").map(String::from);
            let mutation = conductor_core::FileMutation {
                path: path.to_string(),
                kind: conductor_core::MutationKind::Replace,
                diff,
                rename_to: None,
            };
            NormalizedPayload::modify_file(path, vec![mutation])
        }
        "Read" | "read" => {
            let path = str_field(input, "file_path").or_else(|| str_field(input, "path")).unwrap_or_default();
            NormalizedPayload::read_file(path, u32_field(input, "offset"), u32_field(input, "limit"))
        }
        "Glob" | "glob" => NormalizedPayload::code_search(
            None,
            None,
            str_field(input, "path").map(String::from),
            str_field(input, "pattern").map(String::from),
        ),
        "Grep" | "grep" => NormalizedPayload::code_search(
            str_field(input, "query").map(String::from),
            str_field(input, "pattern").map(String::from),
            str_field(input, "path").map(String::from),
            str_field(input, "glob").map(String::from),
        ),
        "webfetch" | "http_request" | "fetch" => {
            NormalizedPayload::http_request(str_field(input, "url").unwrap_or_default(), str_field(input, "method").map(String::from))
        }
        "Task" | "subagent_task" => NormalizedPayload::subagent_task(
            str_field(input, "prompt").unwrap_or_default(),
            str_field(input, "subagent_type").map(String::from),
        ),
        "TodoWrite" | "manage_todos" => {
            let items = input
                .get("todos")
                .and_then(Value::as_array)
                .map(|arr| arr.iter().filter_map(|v| str_field(v, "content").map(String::from)).collect())
                .unwrap_or_default();
            NormalizedPayload::manage_todos(items)
        }
        _ => NormalizedPayload::generic(tool_name, input.clone()),
    }
}

/// Parse a newline-separated search result list (as produced by `glob`/`grep`
/// style tools), strip a trailing truncation banner, and attach the count.
pub fn attach_search_results(payload: NormalizedPayload, raw_output: &str) -> NormalizedPayload {
    payload.with_search_results(raw_output)
}

#[cfg(test)]
#[path = "tool_call_tests.rs"]
mod tests;
