// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sbx-executor: the uniform `ToolExecutor` facade, its local and remote
//! implementations, the fleet health monitor, and the glue that pairs a
//! provisioned workspace with its matching executor (§4.3, §4.9).

pub mod constants;
pub mod diff;
pub mod error;
pub mod executor;
pub mod factory;
pub mod health;
pub mod local;
pub mod remote;

#[cfg(any(test, feature = "test-support"))]
pub mod mock;

pub use error::ExecutorError;
pub use executor::ToolExecutor;
pub use factory::ExecutorFactory;
pub use health::{HealthLevel, HealthMonitor, HealthThresholds, InfraHealth, TaskHealth};
pub use local::LocalToolExecutor;
pub use remote::RemoteToolExecutor;

#[cfg(any(test, feature = "test-support"))]
pub use mock::FakeToolExecutor;
