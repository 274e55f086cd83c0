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

//! Coordination engine
//!
//! ## Purpose
//! [`TupleSpace`] owns the pool and both waiter registries behind a single
//! `tokio::sync::Mutex`. Every operation takes that lock before touching
//! state; blocking operations release it only while parked.
//!
//! ## Wake protocol
//! - `write` inserts, then wakes **every** matching reader and the **first**
//!   live matching taker, in arrival order.
//! - A wake is a hint. The woken task re-acquires the lock and re-scans; if
//!   another task got there first it parks again.
//! - A woken taker that leaves a match for its template in the pool passes
//!   the wake on to the next matching taker.
//! - A waiter is registered before the lock is released, and the signal is a
//!   `oneshot` that holds its value until received, so a write landing between
//!   unlock and `.await` is never lost.
//!
//! ## Ordering
//! Arrival order decides who is *woken* first, not who *gets* the tuple: a
//! woken taker can lose to a fresh `try_take`. Wake signals are delivered at
//! least once; tuples are not delivered in FIFO order across contending takers.
//!
//! ## Cancellation
//! `take_timeout`/`read_timeout` remove their own waiter on expiry and make one
//! last scan. Dropping a parked future deregisters its waiter too; a dropped
//! taker that had already been woken passes the hint on to the next taker.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex};
use tokio::time::Instant;
use tracing::{debug, info, instrument, trace, warn};

use crate::config::SpaceConfig;
use crate::event::{Callback, EventTiming};
use crate::pool::{EntryId, TuplePool};
use crate::template::Template;
use crate::tuple::Tuple;
use crate::waiter::{AccessMode, Signal, Waiter, WaiterId, WaiterRegistry};

/// Statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TupleSpaceStats {
    total_writes: u64,
    total_reads: u64,
    total_takes: u64,
    total_parks: u64,
    total_wakeups: u64,
    callbacks_fired: u64,
    current_size: usize,
    parked_readers: usize,
    parked_takers: usize,
}

impl TupleSpaceStats {
    /// Get total number of write operations
    pub fn total_writes(&self) -> u64 {
        self.total_writes
    }

    /// Get total number of successful read operations
    pub fn total_reads(&self) -> u64 {
        self.total_reads
    }

    /// Get total number of tuples taken
    pub fn total_takes(&self) -> u64 {
        self.total_takes
    }

    /// Times a caller had to park waiting for a match
    pub fn total_parks(&self) -> u64 {
        self.total_parks
    }

    /// Wake signals delivered to parked callers
    pub fn total_wakeups(&self) -> u64 {
        self.total_wakeups
    }

    /// Event callbacks that have run
    pub fn callbacks_fired(&self) -> u64 {
        self.callbacks_fired
    }

    /// Get current number of tuples in the space
    pub fn current_size(&self) -> usize {
        self.current_size
    }

    /// Registered read waiters (parked readers and read callbacks)
    pub fn parked_readers(&self) -> usize {
        self.parked_readers
    }

    /// Registered take waiters (parked takers and take callbacks)
    pub fn parked_takers(&self) -> usize {
        self.parked_takers
    }
}

/// Point-in-time copy of the space, for diagnostics
#[derive(Debug, Clone)]
pub struct SpaceSnapshot {
    /// Stored tuples, oldest first
    pub tuples: Vec<Tuple>,
    /// Templates of registered read waiters, in arrival order
    pub readers: Vec<Template>,
    /// Templates of registered take waiters, in arrival order
    pub takers: Vec<Template>,
}

/// Callbacks released by a state change, run once the lock is dropped
type Fired = Vec<(Callback, Tuple)>;

/// Everything guarded by the coordination lock
struct SpaceState {
    pool: TuplePool,
    readers: WaiterRegistry,
    takers: WaiterRegistry,
    stats: TupleSpaceStats,
}

impl SpaceState {
    fn new() -> Self {
        SpaceState {
            pool: TuplePool::new(),
            readers: WaiterRegistry::new(),
            takers: WaiterRegistry::new(),
            stats: TupleSpaceStats::default(),
        }
    }

    fn registry_mut(&mut self, mode: AccessMode) -> &mut WaiterRegistry {
        match mode {
            AccessMode::Read => &mut self.readers,
            AccessMode::Take => &mut self.takers,
        }
    }

    /// One scan of the pool: copy (read) or remove (take) the oldest match
    fn scan(&mut self, template: &Template, mode: AccessMode) -> Option<Tuple> {
        let found = match mode {
            AccessMode::Read => self.pool.find_first(template).map(Tuple::deep_copy),
            AccessMode::Take => self.pool.take_first(template),
        };
        if found.is_some() {
            match mode {
                AccessMode::Read => self.stats.total_reads += 1,
                AccessMode::Take => {
                    self.stats.total_takes += 1;
                    self.stats.current_size = self.pool.len();
                }
            }
        }
        found
    }

    /// Insert `tuple` and signal the waiters it satisfies
    fn insert_and_wake(&mut self, tuple: Tuple) -> Fired {
        self.stats.total_writes += 1;
        if self.readers.is_empty() && self.takers.is_empty() {
            self.pool.insert(tuple);
            self.stats.current_size = self.pool.len();
            return Vec::new();
        }

        let written = tuple.clone();
        let id = self.pool.insert(tuple);
        let mut fired = Vec::new();

        // Readers are non-exclusive: all of them see this tuple
        for waiter in self.readers.drain_matching(&written) {
            match waiter.signal() {
                Signal::Woken => self.stats.total_wakeups += 1,
                Signal::Dead => {}
                Signal::Fire(callback) => {
                    self.stats.callbacks_fired += 1;
                    fired.push((callback, written.deep_copy()));
                }
            }
        }

        // Takers are exclusive: one tuple, one taker
        fired.extend(self.hand_off(id, &written));

        self.stats.current_size = self.pool.len();
        fired
    }

    /// Signal the first live taker interested in the tuple stored at `id`.
    /// A take callback consumes the tuple on the spot.
    fn hand_off(&mut self, id: EntryId, tuple: &Tuple) -> Option<(Callback, Tuple)> {
        while let Some(waiter) = self.takers.pop_first_matching(tuple) {
            match waiter.signal() {
                Signal::Woken => {
                    self.stats.total_wakeups += 1;
                    return None;
                }
                Signal::Dead => continue,
                Signal::Fire(callback) => {
                    let taken = self.pool.remove(id)?;
                    self.stats.callbacks_fired += 1;
                    self.stats.total_takes += 1;
                    self.stats.current_size = self.pool.len();
                    return Some((callback, taken));
                }
            }
        }
        None
    }

    /// Register a parked waiter for `template`
    fn park(
        &mut self,
        template: Template,
        mode: AccessMode,
        config: &SpaceConfig,
    ) -> (WaiterId, oneshot::Receiver<()>) {
        let (waiter, rx) = Waiter::parked(template);
        let id = waiter.id;
        let registry = self.registry_mut(mode);
        let pruned = registry.prune_dead();
        if pruned > 0 {
            debug!(space = %config.name, %mode, pruned, "pruned abandoned waiters");
        }
        registry.push(waiter);
        let parked = registry.len();
        self.stats.total_parks += 1;

        if config.waiter_warn_threshold > 0 && parked > config.waiter_warn_threshold {
            warn!(
                space = %config.name,
                %mode,
                parked,
                threshold = config.waiter_warn_threshold,
                "waiter registry above threshold"
            );
        }
        (id, rx)
    }

    /// Remove our own waiter if it is still registered
    fn unpark(&mut self, mode: AccessMode, id: WaiterId) -> bool {
        self.registry_mut(mode).remove(id).is_some()
    }

    /// Clean up after a parked caller that went away without re-scanning.
    ///
    /// If the waiter is already gone it was woken; for a taker that wake was
    /// exclusive, so it is passed to the next taker that matches.
    fn abandon(&mut self, mode: AccessMode, id: WaiterId, template: &Template) -> Fired {
        if self.unpark(mode, id) {
            return Vec::new();
        }
        self.pass_on(mode, template)
    }

    /// Forward a consumed take wake to the next taker if a tuple matching
    /// `template` is still stored.
    ///
    /// A woken taker scans oldest-first, so the tuple it was woken for may
    /// still be in the pool after it returns.
    fn pass_on(&mut self, mode: AccessMode, template: &Template) -> Fired {
        if mode == AccessMode::Read {
            return Vec::new();
        }
        let Some(entry) = self.pool.position(template) else {
            return Vec::new();
        };
        let Some(tuple) = self.pool.get(entry).cloned() else {
            return Vec::new();
        };
        self.hand_off(entry, &tuple).into_iter().collect()
    }

    fn snapshot(&self) -> SpaceSnapshot {
        SpaceSnapshot {
            tuples: self.pool.iter().map(Tuple::deep_copy).collect(),
            readers: self.readers.iter().map(|w| w.template.clone()).collect(),
            takers: self.takers.iter().map(|w| w.template.clone()).collect(),
        }
    }

    fn stats(&self) -> TupleSpaceStats {
        let mut stats = self.stats.clone();
        stats.current_size = self.pool.len();
        stats.parked_readers = self.readers.len();
        stats.parked_takers = self.takers.len();
        stats
    }
}

fn dispatch(fired: Fired) {
    for (callback, tuple) in fired {
        callback(tuple);
    }
}

struct Inner {
    state: Mutex<SpaceState>,
    config: SpaceConfig,
}

/// Deregisters a parked waiter if its future is dropped mid-wait
struct ParkedGuard {
    inner: Arc<Inner>,
    mode: AccessMode,
    id: WaiterId,
    template: Template,
    armed: bool,
}

impl ParkedGuard {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for ParkedGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let (mode, id) = (self.mode, self.id);

        if let Ok(mut state) = self.inner.state.try_lock() {
            let fired = state.abandon(mode, id, &self.template);
            drop(state);
            dispatch(fired);
            return;
        }

        // Lock is busy; finish the cleanup on the runtime
        let inner = Arc::clone(&self.inner);
        let template = self.template.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let fired = {
                        let mut state = inner.state.lock().await;
                        state.abandon(mode, id, &template)
                    };
                    dispatch(fired);
                });
            }
            Err(_) => {
                debug!(space = %self.inner.config.name, %id, "no runtime for waiter cleanup, left for pruning");
            }
        }
    }
}

/// Linda tuple space
///
/// Cloning is cheap and every clone refers to the same space.
#[derive(Clone)]
pub struct TupleSpace {
    inner: Arc<Inner>,
}

impl Default for TupleSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TupleSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TupleSpace")
            .field("name", &self.inner.config.name)
            .finish_non_exhaustive()
    }
}

impl TupleSpace {
    /// Create an empty space with default configuration
    pub fn new() -> Self {
        Self::with_config(SpaceConfig::default())
    }

    /// Create an empty space with the given configuration
    pub fn with_config(config: SpaceConfig) -> Self {
        debug!(space = %config.name, "tuple space created");
        TupleSpace {
            inner: Arc::new(Inner {
                state: Mutex::new(SpaceState::new()),
                config,
            }),
        }
    }

    /// Configuration this space was built from
    pub fn config(&self) -> &SpaceConfig {
        &self.inner.config
    }

    /// Space name, as carried in log events
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// Write a tuple to the space.
    ///
    /// Always succeeds. Wakes every parked reader and the first parked taker
    /// whose template matches; fires matching event callbacks after the lock
    /// is released.
    pub async fn write(&self, tuple: Tuple) {
        trace!(space = %self.name(), %tuple, "write");
        let fired = {
            let mut state = self.inner.state.lock().await;
            let fired = state.insert_and_wake(tuple);
            self.check_pool_size(state.pool.len());
            fired
        };
        dispatch(fired);
    }

    /// Write several tuples under one lock hold, in order
    pub async fn write_all(&self, tuples: Vec<Tuple>) {
        let fired = {
            let mut state = self.inner.state.lock().await;
            let mut fired = Vec::new();
            for tuple in tuples {
                fired.extend(state.insert_and_wake(tuple));
            }
            self.check_pool_size(state.pool.len());
            fired
        };
        dispatch(fired);
    }

    /// Take a tuple (destructive read), waiting until one matches
    pub async fn take(&self, template: &Template) -> Tuple {
        loop {
            if let Some(tuple) = self.wait_for(template, AccessMode::Take, None).await {
                return tuple;
            }
        }
    }

    /// Read a tuple (non-destructive), waiting until one matches.
    ///
    /// Returns a deep copy; the stored tuple stays in the space.
    pub async fn read(&self, template: &Template) -> Tuple {
        loop {
            if let Some(tuple) = self.wait_for(template, AccessMode::Read, None).await {
                return tuple;
            }
        }
    }

    /// [`take`](Self::take) that gives up after `timeout`
    pub async fn take_timeout(&self, template: &Template, timeout: Duration) -> Option<Tuple> {
        self.wait_for(template, AccessMode::Take, Some(Instant::now() + timeout))
            .await
    }

    /// [`read`](Self::read) that gives up after `timeout`
    pub async fn read_timeout(&self, template: &Template, timeout: Duration) -> Option<Tuple> {
        self.wait_for(template, AccessMode::Read, Some(Instant::now() + timeout))
            .await
    }

    /// Take the oldest matching tuple, or `None` right away
    pub async fn try_take(&self, template: &Template) -> Option<Tuple> {
        let mut state = self.inner.state.lock().await;
        state.scan(template, AccessMode::Take)
    }

    /// Copy the oldest matching tuple, or `None` right away
    pub async fn try_read(&self, template: &Template) -> Option<Tuple> {
        let mut state = self.inner.state.lock().await;
        state.scan(template, AccessMode::Read)
    }

    /// Take all matching tuples in one atomic step
    pub async fn take_all(&self, template: &Template) -> Vec<Tuple> {
        let mut state = self.inner.state.lock().await;
        let taken = state.pool.take_all(template);
        state.stats.total_takes += taken.len() as u64;
        state.stats.current_size = state.pool.len();
        taken
    }

    /// Copy all matching tuples in one atomic step
    pub async fn read_all(&self, template: &Template) -> Vec<Tuple> {
        let mut state = self.inner.state.lock().await;
        let matching: Vec<Tuple> = state.pool.find_all(template).map(Tuple::deep_copy).collect();
        state.stats.total_reads += matching.len() as u64;
        matching
    }

    /// Register a one-shot callback for a tuple matching `template`.
    ///
    /// Never blocks. With [`EventTiming::Immediate`] a tuple already in the
    /// space can fire the callback straight away; with
    /// [`EventTiming::Future`] only later writes count. In
    /// [`AccessMode::Take`] the delivered tuple is removed from the space.
    pub async fn event_register<F>(
        &self,
        mode: AccessMode,
        timing: EventTiming,
        template: Template,
        callback: F,
    ) where
        F: FnOnce(Tuple) + Send + 'static,
    {
        let callback: Callback = Box::new(callback);
        let mut state = self.inner.state.lock().await;

        let hit = match timing {
            EventTiming::Immediate => state.scan(&template, mode),
            EventTiming::Future => None,
        };

        match hit {
            Some(tuple) => {
                state.stats.callbacks_fired += 1;
                drop(state);
                trace!(space = %self.name(), %mode, %tuple, "event fired on registration");
                callback(tuple);
            }
            None => {
                trace!(space = %self.name(), %mode, %template, "event registered");
                state.registry_mut(mode).push(Waiter::callback(template, callback));
            }
        }
    }

    /// Number of tuples matching `template`
    pub async fn count(&self, template: &Template) -> usize {
        self.inner.state.lock().await.pool.count(template)
    }

    /// Check if any tuple matches `template`
    pub async fn exists(&self, template: &Template) -> bool {
        self.inner
            .state
            .lock()
            .await
            .pool
            .find_first(template)
            .is_some()
    }

    /// Number of stored tuples
    pub async fn len(&self) -> usize {
        self.inner.state.lock().await.pool.len()
    }

    /// True when no tuples are stored
    pub async fn is_empty(&self) -> bool {
        self.inner.state.lock().await.pool.is_empty()
    }

    /// Remove all tuples. Parked callers stay parked.
    pub async fn clear(&self) {
        let mut state = self.inner.state.lock().await;
        state.pool.clear();
        state.stats.current_size = 0;
    }

    /// Get space statistics
    pub async fn stats(&self) -> TupleSpaceStats {
        self.inner.state.lock().await.stats()
    }

    /// Copy of the pool and the templates of every registered waiter
    pub async fn snapshot(&self) -> SpaceSnapshot {
        self.inner.state.lock().await.snapshot()
    }

    /// Log the contents of the space, one line per tuple and waiter
    pub async fn debug(&self, prefix: &str) {
        let snapshot = self.snapshot().await;
        info!(
            space = %self.name(),
            tuples = snapshot.tuples.len(),
            readers = snapshot.readers.len(),
            takers = snapshot.takers.len(),
            "{prefix} tuple space"
        );
        for tuple in &snapshot.tuples {
            info!(space = %self.name(), "{prefix} tuple {tuple}");
        }
        for template in &snapshot.readers {
            info!(space = %self.name(), "{prefix} waiting read {template}");
        }
        for template in &snapshot.takers {
            info!(space = %self.name(), "{prefix} waiting take {template}");
        }
    }

    /// Scan, and park until woken if nothing matches.
    ///
    /// Returns `None` only when `deadline` passes without a match.
    #[instrument(level = "trace", skip(self, template), fields(space = %self.inner.config.name))]
    async fn wait_for(
        &self,
        template: &Template,
        mode: AccessMode,
        deadline: Option<Instant>,
    ) -> Option<Tuple> {
        let mut state = self.inner.state.lock().await;
        let mut woken = false;
        loop {
            if let Some(tuple) = state.scan(template, mode) {
                let fired = if woken {
                    state.pass_on(mode, template)
                } else {
                    Vec::new()
                };
                drop(state);
                dispatch(fired);
                return Some(tuple);
            }

            // Registered while still holding the lock
            let (id, rx) = state.park(template.clone(), mode, &self.inner.config);
            drop(state);
            trace!(%id, %template, "parked");

            let mut guard = ParkedGuard {
                inner: Arc::clone(&self.inner),
                mode,
                id,
                template: template.clone(),
                armed: true,
            };

            let signal = match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, rx).await.ok(),
                None => Some(rx.await),
            };

            state = self.inner.state.lock().await;
            guard.disarm();
            // Gone from the registry means a write signalled us
            woken = !state.unpark(mode, id);

            match signal {
                Some(Ok(())) => trace!(%id, "woken, rescanning"),
                Some(Err(_)) => debug!(%id, "wake channel closed without a signal, retrying"),
                None => {
                    trace!(%id, "deadline passed, final scan");
                    let found = state.scan(template, mode);
                    let fired = if woken && found.is_some() {
                        state.pass_on(mode, template)
                    } else {
                        Vec::new()
                    };
                    drop(state);
                    dispatch(fired);
                    return found;
                }
            }
        }
    }

    fn check_pool_size(&self, size: usize) {
        let threshold = self.inner.config.pool_warn_threshold;
        if threshold > 0 && size > threshold {
            warn!(space = %self.name(), size, threshold, "tuple pool above threshold");
        }
    }
}
