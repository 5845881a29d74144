// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bay-adapters: the narrow boundary between Bay's control plane and the
//! outside world — container lifecycle (`Driver`) and the in-container
//! runtime's HTTP surface (`RuntimeClient`).
//!
//! Neither trait knows about owners, quotas, or retries; that policy lives
//! in `bay-engine`. Adapters only do what their backend can do.

pub mod docker;
pub mod driver;
pub mod error;
pub mod runtime;
pub mod ship;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use docker::DockerDriver;
pub use driver::{ContainerInfo, ContainerStatus, CreateSpec, Driver};
pub use error::{DriverError, RuntimeError};
pub use runtime::{DirEntry, ExecOutcome, RuntimeClient, RuntimeMeta};
pub use ship::ShipClient;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeDriver, FakeRuntimeClient};
