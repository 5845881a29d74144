// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
fn defaults_include_two_builtin_profiles() {
    let settings = Settings::default();
    assert!(settings.get_profile("python-default").is_some());
    assert!(settings.get_profile("python-data").is_some());
    assert!(settings.get_profile("nonexistent").is_none());
}

#[test]
fn default_runtime_port_is_8123_not_8000() {
    // Ship's own listener defaults to 8123; 8000 only appears as the
    // Bay HTTP server's port.
    let settings = Settings::default();
    let profile = settings.get_profile("python-default").unwrap();
    assert_eq!(profile.runtime_port, Some(8123));
    assert_eq!(settings.server.port, 8000);
}

#[test]
#[serial]
fn env_override_wins_over_default() {
    std::env::set_var("BAY_SERVER__HOST", "127.0.0.1");
    let mut settings = Settings::default();
    settings.apply_env_overrides().unwrap();
    assert_eq!(settings.server.host, "127.0.0.1");
    std::env::remove_var("BAY_SERVER__HOST");
}

#[test]
#[serial]
fn invalid_env_port_is_rejected() {
    std::env::set_var("BAY_SERVER__PORT", "not-a-number");
    let mut settings = Settings::default();
    let err = settings.apply_env_overrides().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { var: "BAY_SERVER__PORT", .. }));
    std::env::remove_var("BAY_SERVER__PORT");
}
