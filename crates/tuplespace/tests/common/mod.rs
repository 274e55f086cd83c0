// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright (C) 2025 Shahzad A. Bhatti <bhatti@plexobject.com>
//
// This file is part of linda-tuplespace.
//
// linda-tuplespace is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 2.1 of the License, or
// (at your option) any later version.
//
// linda-tuplespace is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with linda-tuplespace. If not, see <https://www.gnu.org/licenses/>.


//! Shared helpers for integration tests

#![allow(dead_code)]

use linda_tuplespace::TupleSpace;
use std::future::Future;
use std::time::Duration;

/// Upper bound for any single blocking assertion
pub const BOUND: Duration = Duration::from_secs(5);

/// Install a fmt subscriber honouring `RUST_LOG`; safe to call from every test
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Await `fut`, failing the test if it does not finish within [`BOUND`]
pub async fn within<F: Future>(what: &str, fut: F) -> F::Output {
    tokio::time::timeout(BOUND, fut)
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {}", what))
}

/// Spin until `readers` read waiters and `takers` take waiters are registered
pub async fn wait_for_waiters(space: &TupleSpace, readers: usize, takers: usize) {
    within("waiters to register", async {
        loop {
            let stats = space.stats().await;
            if stats.parked_readers() >= readers && stats.parked_takers() >= takers {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
}
