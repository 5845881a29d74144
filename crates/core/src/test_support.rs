// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::OwnerId;

/// Proptest strategies for core state machine types.
pub mod strategies {
    use crate::session::SessionState;
    use proptest::prelude::*;

    pub fn arb_session_state() -> impl Strategy<Value = SessionState> {
        prop_oneof![
            Just(SessionState::Pending),
            Just(SessionState::Starting),
            Just(SessionState::Running),
            Just(SessionState::Stopping),
            Just(SessionState::Stopped),
            Just(SessionState::Failed),
        ]
    }
}

/// A stable owner to use across tests that don't care about multi-tenancy.
pub fn test_owner() -> OwnerId {
    OwnerId::new("test-owner")
}
