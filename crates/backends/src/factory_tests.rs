// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sbx_core::SystemClock;
use serial_test::serial;

#[test]
fn mode_parses_known_strings() {
    assert_eq!("local".parse::<SandboxMode>().unwrap(), SandboxMode::Local);
    assert_eq!("remote".parse::<SandboxMode>().unwrap(), SandboxMode::Remote);
    assert_eq!("vm".parse::<SandboxMode>().unwrap(), SandboxMode::Vm);
    assert!("bogus".parse::<SandboxMode>().is_err());
}

#[test]
#[serial]
fn configured_mode_defaults_to_local() {
    std::env::remove_var("SBX_AGENT_MODE");
    assert_eq!(configured_mode(), SandboxMode::Local);
}

#[test]
#[serial]
fn configured_mode_reads_env_override() {
    std::env::set_var("SBX_AGENT_MODE", "vm");
    assert_eq!(configured_mode(), SandboxMode::Vm);
    std::env::remove_var("SBX_AGENT_MODE");
}

#[tokio::test]
#[serial]
async fn explicit_mode_takes_precedence_over_env() {
    std::env::set_var("SBX_AGENT_MODE", "vm");
    let factory = BackendFactory::new(SystemClock);
    let manager = factory.create_workspace_manager(Some(SandboxMode::Local)).await.unwrap();
    assert!(!manager.is_remote());
    std::env::remove_var("SBX_AGENT_MODE");
}
