// SPDX-License-Identifier: MIT

use super::*;

fn statics() -> Vec<Model> {
    vec![Model::static_entry("sonnet4.5", "Sonnet 4.5", "anthropic", 200_000).default_model()]
}

#[test]
fn resolve_models_prefers_dynamic_when_present() {
    let dynamic = vec![Model::static_entry("opus4.1", "Opus 4.1", "anthropic", 200_000)];
    let resolved = resolve_models(&statics(), dynamic.clone());
    assert_eq!(resolved, dynamic);
}

#[test]
fn resolve_models_falls_back_to_static_on_empty_dynamic() {
    let resolved = resolve_models(&statics(), vec![]);
    assert_eq!(resolved, statics());
}
