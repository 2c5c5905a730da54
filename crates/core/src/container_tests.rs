// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn new_defaults_tag_to_latest() {
    let cfg = ContainerConfig::new("coop-claude");
    assert_eq!(cfg.reference(), "coop-claude:latest");
}

#[test]
fn with_tag_overrides_default() {
    let cfg = ContainerConfig::new("coop-claude").with_tag("0.9.1");
    assert_eq!(cfg.reference(), "coop-claude:0.9.1");
}
