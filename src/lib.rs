// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Empty crate root; this package exists only to host the workspace-level
//! integration tests under `tests/`.
