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


//! Concurrency property tests
//!
//! ## Purpose
//! Exercises the space from many tasks on a multi-threaded runtime:
//! matching is pure, takes are exclusive, reads are non-destructive, blocked
//! callers are always woken, and bulk scans see whole writes only.

mod common;

use common::{init_tracing, wait_for_waiters, within};
use linda_tuplespace::{template, tuple, FieldType, Template, TemplateField, Tuple, TupleSpace, ANY};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Matching depends on arity and per-position equality only, and is repeatable
#[test]
fn test_match_is_pure() {
    let cases: Vec<(Tuple, Template, bool)> = vec![
        (tuple!("a", 1), template!("a", 1), true),
        (tuple!("a", 1), template!("a", 2), false),
        (tuple!("a", 1), template!(ANY, ANY), true),
        (tuple!("a", 1), template!(ANY), false),
        (tuple!("a", 1), template!("a", 1, ANY), false),
        (tuple!(1), template!(1.0), false),
        (tuple!(1.5), template!(FieldType::Float), true),
        (tuple!(true, ()), template!(FieldType::Boolean, FieldType::Null), true),
        (tuple!(vec![1u8, 2]), template!(vec![1u8, 2]), true),
        (tuple!(), template!(), true),
    ];

    for (candidate, pattern, expected) in &cases {
        for _ in 0..3 {
            assert_eq!(
                linda_tuplespace::matches(candidate, pattern),
                *expected,
                "{} vs {}",
                candidate,
                pattern
            );
        }
    }
}

/// A predicate field sees only its own position
#[test]
fn test_predicate_field() {
    let even = TemplateField::predicate(|f| matches!(f.as_integer(), Some(n) if n % 2 == 0));
    let pattern = Template::new(vec![TemplateField::from("n"), even]);

    assert!(pattern.matches(&tuple!("n", 4)));
    assert!(!pattern.matches(&tuple!("n", 3)));
    assert!(!pattern.matches(&tuple!("n", "4")));
}

/// N copies are taken exactly N times across racing tasks
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_take_exclusivity_under_contention() {
    init_tracing();
    const COPIES: usize = 200;
    const TASKS: usize = 8;

    let space = TupleSpace::new();
    for _ in 0..COPIES {
        space.write(tuple!("token", 1)).await;
    }

    let taken = Arc::new(AtomicUsize::new(0));
    let handles: Vec<_> = (0..TASKS)
        .map(|_| {
            let space = space.clone();
            let taken = taken.clone();
            tokio::spawn(async move {
                let pattern = template!("token", ANY);
                while space.try_take(&pattern).await.is_some() {
                    taken.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();

    for handle in handles {
        within("try_take workers", handle).await.expect("worker panicked");
    }

    assert_eq!(taken.load(Ordering::SeqCst), COPIES);
    assert!(space.try_take(&template!("token", ANY)).await.is_none());
    assert_eq!(space.stats().await.total_takes(), COPIES as u64);
}

/// Blocked takers and concurrent writers: every write satisfies one taker
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_blocked_takers_each_get_one() {
    init_tracing();
    const N: i64 = 50;

    let space = TupleSpace::new();
    let takers: Vec<_> = (0..N)
        .map(|_| {
            let space = space.clone();
            tokio::spawn(async move { space.take(&template!("work", FieldType::Integer)).await })
        })
        .collect();

    let writers: Vec<_> = (0..N)
        .map(|i| {
            let space = space.clone();
            tokio::spawn(async move { space.write(tuple!("work", i)).await })
        })
        .collect();

    for writer in writers {
        writer.await.expect("writer panicked");
    }

    let mut seen = Vec::new();
    for taker in takers {
        let t = within("blocked taker", taker).await.expect("taker panicked");
        seen.extend(t.get(1).and_then(|f| f.as_integer()));
    }
    seen.sort_unstable();

    assert_eq!(seen, (0..N).collect::<Vec<_>>());
    assert!(space.is_empty().await);
}

/// Reads never shrink the pool and repeat the same answer
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reads_are_non_destructive() {
    init_tracing();
    let space = TupleSpace::new();
    space.write(tuple!("k", "v1")).await;
    space.write(tuple!("k", "v2")).await;

    let pattern = template!("k", ANY);
    let first = space.read_all(&pattern).await;

    let readers: Vec<_> = (0..16)
        .map(|_| {
            let space = space.clone();
            let pattern = pattern.clone();
            tokio::spawn(async move {
                let one = space.read(&pattern).await;
                let maybe = space.try_read(&pattern).await;
                let all = space.read_all(&pattern).await;
                (one, maybe, all)
            })
        })
        .collect();

    for reader in readers {
        let (one, maybe, all) = within("reader", reader).await.expect("reader panicked");
        assert_eq!(one, tuple!("k", "v1"));
        assert_eq!(maybe, Some(tuple!("k", "v1")));
        assert_eq!(all, first);
    }
    assert_eq!(space.count(&pattern).await, 2);
}

/// A single blocked caller is always woken by a matching write
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_blocked_caller_never_misses_write() {
    init_tracing();
    let space = TupleSpace::new();

    for round in 0..200i64 {
        let waiter = {
            let space = space.clone();
            tokio::spawn(async move {
                if round % 2 == 0 {
                    space.take(&template!("tick", round)).await
                } else {
                    space.read(&template!("tick", round)).await
                }
            })
        };

        // Alternate between racing the park and writing after it
        if round % 3 == 0 {
            let (readers, takers) = if round % 2 == 0 { (0, 1) } else { (1, 0) };
            wait_for_waiters(&space, readers, takers).await;
        } else {
            tokio::task::yield_now().await;
        }
        space.write(tuple!("tick", round)).await;

        let got = within("woken caller", waiter).await.expect("caller panicked");
        assert_eq!(got, tuple!("tick", round));
    }

    let stats = space.stats().await;
    assert_eq!(stats.parked_readers(), 0);
    assert_eq!(stats.parked_takers(), 0);
}

/// Bulk scans see each batched write entirely or not at all
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_bulk_scan_sees_whole_batches() {
    init_tracing();
    const BATCH: i64 = 5;
    const BATCHES: i64 = 100;

    let space = TupleSpace::new();
    let writer = {
        let space = space.clone();
        tokio::spawn(async move {
            for b in 0..BATCHES {
                let batch = (0..BATCH).map(|i| tuple!("batch", b, i)).collect();
                space.write_all(batch).await;
            }
        })
    };

    let pattern = template!("batch", ANY, ANY);
    within("drain batches", async {
        let mut drained = 0usize;
        while drained < (BATCH * BATCHES) as usize {
            let seen = space.read_all(&pattern).await;
            assert_eq!(seen.len() % BATCH as usize, 0, "partial batch visible to read_all");

            let taken = space.take_all(&pattern).await;
            assert_eq!(taken.len() % BATCH as usize, 0, "partial batch visible to take_all");
            drained += taken.len();
            tokio::task::yield_now().await;
        }
    })
    .await;

    within("batch writer", writer).await.expect("writer panicked");
    assert!(space.is_empty().await);
}

/// A woken taker that takes an older tuple hands its wake to the next taker
#[tokio::test]
async fn test_woken_taker_forwards_leftover_tuple() {
    init_tracing();
    let space = TupleSpace::new();

    // Parked first, then left unpolled so its wake goes unused for a while
    let narrow_tmpl = template!("z", ANY);
    let narrow = space.take_timeout(&narrow_tmpl, Duration::from_millis(100));
    tokio::pin!(narrow);
    tokio::select! {
        biased;
        _ = &mut narrow => panic!("nothing to take yet"),
        _ = tokio::task::yield_now() => {}
    }
    wait_for_waiters(&space, 0, 1).await;

    let spawn_taker = || {
        let space = space.clone();
        tokio::spawn(async move { space.take(&template!(ANY, ANY)).await })
    };
    let first = spawn_taker();
    wait_for_waiters(&space, 0, 2).await;
    let second = spawn_taker();
    wait_for_waiters(&space, 0, 3).await;

    // ("z", 1) wakes the narrow taker, ("x", 1) wakes `first`
    space.write(tuple!("z", 1)).await;
    space.write(tuple!("x", 1)).await;

    let got_first = within("first taker", first).await.expect("taker panicked");
    let got_second = within("second taker", second).await.expect("taker panicked");
    assert_eq!(got_first, tuple!("z", 1));
    assert_eq!(got_second, tuple!("x", 1));

    assert_eq!(within("narrow taker", &mut narrow).await, None);
    assert!(space.is_empty().await);
    assert_eq!(space.stats().await.parked_takers(), 0);
}
